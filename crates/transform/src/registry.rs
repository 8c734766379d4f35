//! Transformer Registry - Kind name to factory lookup
//!
//! Workers are configured with a kind name (`regex`, `noop`) and a table
//! of kind-specific parameters. The registry resolves the name to a
//! factory which parses the parameters.
//!
//! # Example
//!
//! ```
//! use sysrelay_transform::{NoopFactory, TransformerConfig, TransformerRegistry};
//!
//! let mut registry = TransformerRegistry::new();
//! registry.register("noop", NoopFactory);
//!
//! let transformer = registry.create("noop", &TransformerConfig::new()).unwrap();
//! assert_eq!(transformer.name(), "noop");
//! ```

use std::collections::HashMap;

use crate::{TransformError, TransformResult, Transformer};

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Parameters passed to transformer factories
///
/// This is the `[workers.params]` table, in declaration order.
pub type TransformerConfig = toml::Table;

/// Factory trait for creating transformers
pub trait TransformerFactory: Send + Sync {
    /// Create a transformer instance from parameters
    ///
    /// # Errors
    /// Returns a config error (`TransformError::is_config`) if the
    /// parameters are invalid
    fn create(&self, config: &TransformerConfig) -> TransformResult<Box<dyn Transformer>>;

    /// Human-readable name for this factory (for error messages)
    fn name(&self) -> &'static str;
}

/// Registry for transformer factories
pub struct TransformerRegistry {
    factories: HashMap<String, Box<dyn TransformerFactory>>,
}

impl TransformerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a transformer factory
    ///
    /// # Panics
    /// Panics if a factory is already registered with this name.
    /// Use `try_register` for fallible registration.
    pub fn register<F: TransformerFactory + 'static>(&mut self, kind: &str, factory: F) {
        if self.factories.contains_key(kind) {
            panic!("Transformer factory '{}' already registered", kind);
        }
        self.factories.insert(kind.to_string(), Box::new(factory));
    }

    /// Try to register a transformer factory
    ///
    /// Returns `false` if a factory is already registered with this name.
    pub fn try_register<F: TransformerFactory + 'static>(&mut self, kind: &str, factory: F) -> bool {
        if self.factories.contains_key(kind) {
            return false;
        }
        self.factories.insert(kind.to_string(), Box::new(factory));
        true
    }

    /// Create a transformer from its kind and parameters
    ///
    /// # Errors
    /// - `TransformError::Config` if the kind is not registered
    /// - whatever the factory returns for invalid parameters
    pub fn create(
        &self,
        kind: &str,
        config: &TransformerConfig,
    ) -> TransformResult<Box<dyn Transformer>> {
        let factory = self.factories.get(kind).ok_or_else(|| {
            let mut available = self.available_types();
            available.sort_unstable();
            TransformError::config(format!(
                "unknown transformer type '{}', available: [{}]",
                kind,
                available.join(", ")
            ))
        })?;

        factory.create(config)
    }

    /// Check if a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Get list of registered kinds
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for `NoopTransformer`
pub struct NoopFactory;

impl TransformerFactory for NoopFactory {
    fn create(&self, _config: &TransformerConfig) -> TransformResult<Box<dyn Transformer>> {
        Ok(Box::new(crate::noop::NoopTransformer::new()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
