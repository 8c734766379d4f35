//! Regex substitution configuration
//!
//! Parsed from `[workers.params]`:
//!
//! | Key             | Type                    | Description                                  |
//! |-----------------|-------------------------|----------------------------------------------|
//! | `options`       | string or string array  | Regex options shared by every rule           |
//! | `substitutions` | table                   | pattern = replacement, in declaration order  |
//! | `rules`         | array of tables         | `{ pattern, replacement, ignore_case? }`     |
//!
//! `substitutions` and `rules` are alternatives; using both is an error.

use crate::registry::TransformerConfig;
use crate::{TransformError, TransformResult};

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Regex options shared by a transformer's rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexOptions {
    /// Case-insensitive matching
    pub ignore_case: bool,
    /// `^` and `$` match at line boundaries
    pub multi_line: bool,
    /// `.` also matches `\n`
    pub dot_matches_new_line: bool,
    /// Whitespace and `#` comments in patterns are ignored
    pub ignore_whitespace: bool,
}

impl RegexOptions {
    /// No options set
    pub const NONE: Self = Self {
        ignore_case: false,
        multi_line: false,
        dot_matches_new_line: false,
        ignore_whitespace: false,
    };

    /// Apply one named option
    ///
    /// Names are matched case-insensitively with `_` and `-` ignored, so
    /// `ignore_case`, `IgnoreCase` and `ignore-case` are the same option.
    pub fn apply(&mut self, name: &str) -> TransformResult<()> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "none" => *self = Self::NONE,
            "ignorecase" => self.ignore_case = true,
            "multiline" => self.multi_line = true,
            "singleline" => self.dot_matches_new_line = true,
            "ignorepatternwhitespace" => self.ignore_whitespace = true,
            _ => {
                return Err(TransformError::config(format!(
                    "unknown regex option '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Parse an `options` value (string or array of strings)
    pub fn from_value(value: &toml::Value) -> TransformResult<Self> {
        let mut options = Self::NONE;
        match value {
            toml::Value::String(s) => {
                for name in s.split(['|', ',']).map(str::trim).filter(|s| !s.is_empty()) {
                    options.apply(name)?;
                }
            }
            toml::Value::Array(items) => {
                for item in items {
                    let name = item.as_str().ok_or_else(|| {
                        TransformError::config("regex options must be strings")
                    })?;
                    options.apply(name)?;
                }
            }
            other => {
                return Err(TransformError::config(format!(
                    "regex options must be a string or array, got {}",
                    other.type_str()
                )));
            }
        }
        Ok(options)
    }
}

impl Default for RegexOptions {
    /// Case-insensitive matching
    fn default() -> Self {
        Self {
            ignore_case: true,
            ..Self::NONE
        }
    }
}

/// One configured substitution before compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Pattern source
    pub pattern: String,
    /// Replacement (supports `$1` / `${name}`)
    pub replacement: String,
    /// Per-rule override of `RegexOptions::ignore_case`
    pub ignore_case: Option<bool>,
}

/// Configuration for the regex transformer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexConfig {
    /// Shared options
    pub options: RegexOptions,
    /// Rules in application order
    pub rules: Vec<RuleSpec>,
}

impl RegexConfig {
    /// Append a rule
    #[must_use]
    pub fn with_rule(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.rules.push(RuleSpec {
            pattern: pattern.into(),
            replacement: replacement.into(),
            ignore_case: None,
        });
        self
    }

    /// Replace the shared options
    #[must_use]
    pub fn with_options(mut self, options: RegexOptions) -> Self {
        self.options = options;
        self
    }
}

impl TryFrom<&TransformerConfig> for RegexConfig {
    type Error = TransformError;

    fn try_from(params: &TransformerConfig) -> Result<Self, Self::Error> {
        let mut config = RegexConfig::default();

        for key in params.keys() {
            if !matches!(key.as_str(), "options" | "substitutions" | "rules") {
                return Err(TransformError::config(format!(
                    "unknown regex parameter '{}'",
                    key
                )));
            }
        }

        if let Some(options) = params.get("options") {
            config.options = RegexOptions::from_value(options)?;
        }

        match (params.get("substitutions"), params.get("rules")) {
            (Some(_), Some(_)) => {
                return Err(TransformError::config(
                    "use either 'substitutions' or 'rules', not both",
                ));
            }
            (Some(subs), None) => config.rules = parse_substitutions(subs)?,
            (None, Some(rules)) => config.rules = parse_rules(rules)?,
            (None, None) => {}
        }

        Ok(config)
    }
}

fn parse_substitutions(value: &toml::Value) -> TransformResult<Vec<RuleSpec>> {
    let table = value
        .as_table()
        .ok_or_else(|| TransformError::config("'substitutions' must be a table"))?;

    table
        .iter()
        .map(|(pattern, replacement)| {
            let replacement = replacement.as_str().ok_or_else(|| {
                TransformError::config(format!(
                    "replacement for '{}' must be a string",
                    pattern
                ))
            })?;
            Ok(RuleSpec {
                pattern: pattern.clone(),
                replacement: replacement.to_string(),
                ignore_case: None,
            })
        })
        .collect()
}

fn parse_rules(value: &toml::Value) -> TransformResult<Vec<RuleSpec>> {
    let rules = value
        .as_array()
        .ok_or_else(|| TransformError::config("'rules' must be an array of tables"))?;

    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let table = rule
                .as_table()
                .ok_or_else(|| TransformError::config(format!("rules[{}] must be a table", i)))?;
            let pattern = table
                .get("pattern")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TransformError::config(format!("rules[{}] requires string 'pattern'", i))
                })?;
            let replacement = table
                .get("replacement")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TransformError::config(format!("rules[{}] requires string 'replacement'", i))
                })?;
            let ignore_case = match table.get("ignore_case") {
                None => None,
                Some(v) => Some(v.as_bool().ok_or_else(|| {
                    TransformError::config(format!("rules[{}].ignore_case must be a boolean", i))
                })?),
            };
            Ok(RuleSpec {
                pattern: pattern.to_string(),
                replacement: replacement.to_string(),
                ignore_case,
            })
        })
        .collect()
}
