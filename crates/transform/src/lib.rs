//! sysrelay - Transform
//!
//! Per-message transformation applied by relay workers before forwarding.
//!
//! # Overview
//!
//! A transformer turns one decoded message into the text that is sent
//! downstream. Failing transforms drop the message; the worker reports
//! the failure and moves on.
//!
//! # Design Principles
//!
//! - **Fast**: Transformers run inline in the worker loop
//! - **Thread-safe**: One instance per worker, but `Send + Sync` regardless
//! - **Config-driven**: Workers look up their kind in a `TransformerRegistry`
//!
//! # Adding a New Transformer
//!
//! 1. Implement `Transformer` on your type.
//! 2. Implement `TransformerFactory` that parses its `[workers.params]`.
//! 3. Register the factory in `create_default_registry()`.
//!
//! Worker and dispatch code never changes for a new kind.
//!
//! # Modules
//!
//! - `registry` - Kind name to factory lookup
//! - `noop` - Pass-through
//! - `substitution` - Ordered regex substitution
//!
//! # Example
//!
//! ```
//! use sysrelay_transform::{RegexRule, RegexTransformer, Transformer};
//!
//! let transformer = RegexTransformer::new(vec![
//!     RegexRule::new("a", "b").unwrap(),
//!     RegexRule::new("b", "c").unwrap(),
//! ]);
//! assert_eq!(transformer.transform("a").unwrap(), "c");
//! ```

mod error;
pub mod noop;
pub mod registry;
pub mod substitution;

pub use error::TransformError;
pub use noop::NoopTransformer;
pub use registry::{NoopFactory, TransformerConfig, TransformerFactory, TransformerRegistry};
pub use substitution::{RegexConfig, RegexFactory, RegexOptions, RegexRule, RegexTransformer};

/// Result type for transformer operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Trait for message transformers
///
/// Implementors must be `Send + Sync` so a worker task can own one
/// across await points.
pub trait Transformer: Send + Sync {
    /// Transform one message
    ///
    /// Returning an error drops the message.
    fn transform(&self, message: &str) -> TransformResult<String>;

    /// Name of this transformer for logging
    fn name(&self) -> &'static str;
}

/// Create a registry with every built-in transformer
///
/// Includes:
/// - `regex` - Ordered regex substitution
/// - `noop` - Pass-through
pub fn create_default_registry() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    registry.register("regex", RegexFactory);
    registry.register("noop", NoopFactory);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_kinds() {
        let registry = create_default_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("regex"));
        assert!(registry.contains("noop"));
    }

    #[test]
    fn test_default_registry_creates_regex() {
        let registry = create_default_registry();
        let mut subs = toml::Table::new();
        subs.insert("a".into(), toml::Value::String("b".into()));
        let mut config = TransformerConfig::new();
        config.insert("substitutions".into(), toml::Value::Table(subs));

        let transformer = registry.create("regex", &config).unwrap();
        assert_eq!(transformer.name(), "regex");
        assert_eq!(transformer.transform("aaa").unwrap(), "bbb");
    }
}
