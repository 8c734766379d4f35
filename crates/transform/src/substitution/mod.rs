//! Regex Substitution Transformer
//!
//! Applies an ordered list of regex replacements to every message. Rule
//! N sees the output of rule N-1, so rules compose:
//!
//! ```toml
//! [workers]
//! kind = "regex"
//!
//! [workers.params]
//! options = ["ignore_case"]
//!
//! [workers.params.substitutions]
//! "a" = "b"
//! "b" = "c"     # "a" ends up as "c"
//! ```
//!
//! Replacements use `$1` / `${name}` group references and `$$` for a
//! literal dollar. A numbered reference ends at its last digit, so
//! `$1anon` is group 1 followed by `anon`.
//!
//! Patterns are compiled once when the transformer is built; an invalid
//! pattern is a configuration error, never a per-message one.

mod config;

pub use config::{RegexConfig, RegexOptions, RuleSpec};

use regex::{Regex, RegexBuilder};

use crate::registry::{TransformerConfig, TransformerFactory};
use crate::{TransformError, TransformResult, Transformer};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// One compiled pattern with its replacement
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    replacement: String,
}

impl RegexRule {
    /// Compile a rule with default options (case-insensitive)
    pub fn new(pattern: &str, replacement: impl Into<String>) -> TransformResult<Self> {
        Self::with_options(pattern, replacement, RegexOptions::default())
    }

    /// Compile a rule with explicit options
    pub fn with_options(
        pattern: &str,
        replacement: impl Into<String>,
        options: RegexOptions,
    ) -> TransformResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.ignore_case)
            .multi_line(options.multi_line)
            .dot_matches_new_line(options.dot_matches_new_line)
            .ignore_whitespace(options.ignore_whitespace)
            .build()
            .map_err(|source| TransformError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        let replacement: String = replacement.into();
        Ok(Self {
            regex,
            replacement: brace_numbered_groups(&replacement),
        })
    }

    /// Pattern source
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Replacement template as handed to `regex` (numbered groups braced)
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match in `input`
    #[inline]
    fn apply(&self, input: &str) -> String {
        self.regex
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }
}

/// Rewrite `$<digits>` as `${<digits>}`
///
/// `regex` reads `$1anon` as a group named `1anon`, which never exists
/// and expands to nothing. Escaped dollars (`$$`) and braced references
/// are left alone.
fn brace_numbered_groups(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut rest = replacement;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push_str("$$");
            rest = tail;
            continue;
        }

        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            out.push('$');
            rest = after;
        } else {
            out.push_str("${");
            out.push_str(&after[..digits]);
            out.push('}');
            rest = &after[digits..];
        }
    }

    out.push_str(rest);
    out
}

/// Ordered regex substitution
#[derive(Debug, Clone, Default)]
pub struct RegexTransformer {
    rules: Vec<RegexRule>,
}

impl RegexTransformer {
    /// Create from compiled rules (applied in vector order)
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    /// Compile every rule of a config
    ///
    /// # Errors
    /// `TransformError::InvalidPattern` for the first pattern that does
    /// not compile
    pub fn from_config(config: &RegexConfig) -> TransformResult<Self> {
        let rules = config
            .rules
            .iter()
            .map(|spec| {
                let mut options = config.options;
                if let Some(ignore_case) = spec.ignore_case {
                    options.ignore_case = ignore_case;
                }
                RegexRule::with_options(&spec.pattern, spec.replacement.as_str(), options)
            })
            .collect::<TransformResult<Vec<_>>>()?;

        Ok(Self::new(rules))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules (messages pass through unchanged)
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order
    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }
}

impl Transformer for RegexTransformer {
    fn transform(&self, message: &str) -> TransformResult<String> {
        let mut current = message.to_owned();
        for rule in &self.rules {
            current = rule.apply(&current);
        }
        Ok(current)
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

/// Factory for creating regex transformers from `[workers.params]`
#[derive(Debug, Clone, Copy)]
pub struct RegexFactory;

impl TransformerFactory for RegexFactory {
    fn create(&self, config: &TransformerConfig) -> TransformResult<Box<dyn Transformer>> {
        let regex_config = RegexConfig::try_from(config)?;
        if regex_config.rules.is_empty() {
            tracing::warn!("regex transformer has no substitutions, messages pass through unchanged");
        }
        Ok(Box::new(RegexTransformer::from_config(&regex_config)?))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
