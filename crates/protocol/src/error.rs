//! Protocol error types

use thiserror::Error;

/// Errors raised while interpreting syslog wire data
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Message does not start with a `<PRI>` header
    #[error("missing priority header")]
    MissingPriority,

    /// `<PRI>` header is present but malformed
    #[error("invalid priority header: {0}")]
    InvalidPriority(String),

    /// Severity code outside 0..=7
    #[error("invalid severity code {0}")]
    InvalidSeverity(u8),
}
