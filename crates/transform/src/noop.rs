//! Noop Transformer - Pass-through
//!
//! Forwards every message unchanged. Selected with `kind = "noop"` when
//! the relay should only re-frame and fan out.

use crate::{TransformResult, Transformer};

/// A transformer that returns its input
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransformer;

impl NoopTransformer {
    /// Create a new noop transformer
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl Transformer for NoopTransformer {
    fn transform(&self, message: &str) -> TransformResult<String> {
        Ok(message.to_owned())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
