//! Pipeline error types
//!
//! Only `RelayServer::start` returns errors. Everything that goes wrong
//! once the server is running is recovered locally and surfaces through
//! the `ErrorSink`.

use thiserror::Error;

use sysrelay_config::ConfigError;
use sysrelay_sources::ListenerError;
use sysrelay_transform::TransformError;

/// Server lifecycle errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Worker transformer could not be built (unknown kind, bad pattern)
    #[error("failed to create transformer: {0}")]
    Transform(#[from] TransformError),

    /// Listening socket could not be set up
    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    /// `start()` called on a running server
    #[error("server is already running")]
    AlreadyRunning,
}

impl ServerError {
    /// Whether the error is a configuration problem
    ///
    /// Invalid ports, worker counts, patterns and bind addresses.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::Transform(_) => true,
            Self::Listener(e) => e.is_config(),
            Self::AlreadyRunning => false,
        }
    }

    /// Whether the error comes from the OS (socket creation, bind)
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Listener(e) if !e.is_config())
    }
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        let err = ServerError::from(ConfigError::missing_field("downstream", "port"));
        assert!(err.is_config());
        assert!(!err.is_resource());
        assert!(err.to_string().contains("port"));

        let err = ServerError::from(TransformError::config("unknown transformer type 'lua'"));
        assert!(err.is_config());
    }

    #[test]
    fn test_bind_error_is_resource() {
        let err = ServerError::from(ListenerError::Bind {
            address: "127.0.0.1:5140".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        });
        assert!(err.is_resource());
        assert!(!err.is_config());
        assert!(err.to_string().contains("127.0.0.1:5140"));
    }

    #[test]
    fn test_already_running() {
        let err = ServerError::AlreadyRunning;
        assert!(!err.is_config());
        assert!(!err.is_resource());
    }
}
