use super::*;

fn params(src: &str) -> TransformerConfig {
    src.parse::<toml::Table>().unwrap()
}

#[test]
fn test_default_options_ignore_case() {
    let options = RegexOptions::default();
    assert!(options.ignore_case);
    assert!(!options.multi_line);
    assert!(!options.dot_matches_new_line);
    assert!(!options.ignore_whitespace);
}

#[test]
fn test_options_name_normalization() {
    for name in ["ignore_case", "IgnoreCase", "ignore-case", "IGNORECASE"] {
        let mut options = RegexOptions::NONE;
        options.apply(name).unwrap();
        assert!(options.ignore_case, "{} should enable ignore_case", name);
    }
}

#[test]
fn test_options_none_resets() {
    let mut options = RegexOptions::default();
    options.apply("none").unwrap();
    assert_eq!(options, RegexOptions::NONE);
}

#[test]
fn test_options_from_string_list() {
    let value = toml::Value::String("Multiline | Singleline".into());
    let options = RegexOptions::from_value(&value).unwrap();
    assert!(options.multi_line);
    assert!(options.dot_matches_new_line);
    assert!(!options.ignore_case);
}

#[test]
fn test_options_from_array() {
    let value = toml::Value::Array(vec![
        toml::Value::String("ignore_case".into()),
        toml::Value::String("ignore_pattern_whitespace".into()),
    ]);
    let options = RegexOptions::from_value(&value).unwrap();
    assert!(options.ignore_case);
    assert!(options.ignore_whitespace);
}

#[test]
fn test_options_unknown_name() {
    let mut options = RegexOptions::NONE;
    let err = options.apply("compiled").unwrap_err();
    assert!(err.to_string().contains("compiled"));
}

#[test]
fn test_options_wrong_type() {
    let err = RegexOptions::from_value(&toml::Value::Integer(1)).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_empty_params() {
    let config = RegexConfig::try_from(&TransformerConfig::new()).unwrap();
    assert_eq!(config, RegexConfig::default());
}

#[test]
fn test_substitutions_keep_order() {
    let config = RegexConfig::try_from(&params(
        r#"
        [substitutions]
        "z" = "1"
        "a" = "2"
        "m" = "3"
        "#,
    ))
    .unwrap();

    let patterns: Vec<_> = config.rules.iter().map(|r| r.pattern.as_str()).collect();
    assert_eq!(patterns, ["z", "a", "m"]);
    assert_eq!(config.rules[2].replacement, "3");
}

#[test]
fn test_rules_array() {
    let config = RegexConfig::try_from(&params(
        r#"
        options = "none"

        [[rules]]
        pattern = "host=(\\w+)"
        replacement = "host=<$1>"

        [[rules]]
        pattern = "secret"
        replacement = "***"
        ignore_case = true
        "#,
    ))
    .unwrap();

    assert_eq!(config.options, RegexOptions::NONE);
    assert_eq!(config.rules.len(), 2);
    assert_eq!(config.rules[0].ignore_case, None);
    assert_eq!(config.rules[1].ignore_case, Some(true));
}

#[test]
fn test_substitutions_and_rules_conflict() {
    let err = RegexConfig::try_from(&params(
        r#"
        substitutions = { "a" = "b" }
        rules = [{ pattern = "c", replacement = "d" }]
        "#,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("not both"));
}

#[test]
fn test_non_string_replacement() {
    let err = RegexConfig::try_from(&params("substitutions = { \"a\" = 1 }")).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_rule_missing_pattern() {
    let err = RegexConfig::try_from(&params("rules = [{ replacement = \"x\" }]")).unwrap_err();
    assert!(err.to_string().contains("rules[0]"));
}

#[test]
fn test_unknown_parameter() {
    let err = RegexConfig::try_from(&params("patterns = []")).unwrap_err();
    assert!(err.to_string().contains("patterns"));
}

#[test]
fn test_builder() {
    let config = RegexConfig::default()
        .with_options(RegexOptions::NONE)
        .with_rule("a", "b");
    assert_eq!(config.rules.len(), 1);
    assert!(!config.options.ignore_case);
}
