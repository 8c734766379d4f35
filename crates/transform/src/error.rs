//! Transform error types
//!
//! Errors that can occur while building or running a transformer.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors that can occur during transformation
#[derive(Debug, Error)]
pub enum TransformError {
    /// A regex pattern did not compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transformation logic failed for one message
    #[error("transform failed: {0}")]
    TransformFailed(String),
}

impl TransformError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transform failed error
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::TransformFailed(msg.into())
    }

    /// Whether this error comes from construction rather than a message
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidPattern { .. } | Self::Config(_))
    }
}
