//! Tests for transform errors

use super::*;

#[test]
fn test_config_error() {
    let err = TransformError::config("missing substitutions");
    assert!(err.is_config());
    assert_eq!(err.to_string(), "invalid configuration: missing substitutions");
}

#[test]
fn test_failed_error() {
    let err = TransformError::failed("too long");
    assert!(!err.is_config());
    assert!(err.to_string().contains("too long"));
}

#[test]
fn test_invalid_pattern_error() {
    let source = regex::Regex::new("(unclosed").unwrap_err();
    let err = TransformError::InvalidPattern {
        pattern: "(unclosed".into(),
        source,
    };
    assert!(err.is_config());
    assert!(err.to_string().contains("(unclosed"));
    assert!(std::error::Error::source(&err).is_some());
}
