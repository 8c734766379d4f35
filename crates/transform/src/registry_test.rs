//! Tests for transformer registry

use super::*;
use crate::{TransformResult, Transformer};

struct UppercaseTransformer;

impl Transformer for UppercaseTransformer {
    fn transform(&self, message: &str) -> TransformResult<String> {
        Ok(message.to_ascii_uppercase())
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}

struct UppercaseFactory;

impl TransformerFactory for UppercaseFactory {
    fn create(&self, _config: &TransformerConfig) -> TransformResult<Box<dyn Transformer>> {
        Ok(Box::new(UppercaseTransformer))
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}

#[test]
fn test_empty_registry() {
    let registry = TransformerRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.available_types().is_empty());
}

#[test]
fn test_register_and_create() {
    let mut registry = TransformerRegistry::new();
    registry.register("noop", NoopFactory);

    assert_eq!(registry.len(), 1);
    assert!(registry.contains("noop"));
    assert!(!registry.contains("nonexistent"));

    let transformer = registry.create("noop", &TransformerConfig::new()).unwrap();
    assert_eq!(transformer.name(), "noop");
    assert_eq!(transformer.transform("x").unwrap(), "x");
}

#[test]
fn test_custom_kind_needs_no_worker_changes() {
    let mut registry = TransformerRegistry::new();
    registry.register("uppercase", UppercaseFactory);

    let transformer = registry.create("uppercase", &TransformerConfig::new()).unwrap();
    assert_eq!(transformer.transform("<13>shout").unwrap(), "<13>SHOUT");
}

#[test]
fn test_create_unknown_type() {
    let mut registry = TransformerRegistry::new();
    registry.register("noop", NoopFactory);

    let err = registry
        .create("unknown", &TransformerConfig::new())
        .err()
        .unwrap();
    assert!(err.is_config());
    assert!(err.to_string().contains("unknown transformer type 'unknown'"));
    assert!(err.to_string().contains("noop"));
}

#[test]
#[should_panic(expected = "already registered")]
fn test_duplicate_registration_panics() {
    let mut registry = TransformerRegistry::new();
    registry.register("noop", NoopFactory);
    registry.register("noop", NoopFactory);
}

#[test]
fn test_try_register() {
    let mut registry = TransformerRegistry::new();
    assert!(registry.try_register("noop", NoopFactory));
    assert!(!registry.try_register("noop", NoopFactory));
    assert_eq!(registry.len(), 1);
}
