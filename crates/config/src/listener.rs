//! Listener configuration
//!
//! The inbound side: where clients connect and how their streams are framed.

use serde::Deserialize;

/// Inbound TCP listener configuration
///
/// # Example
///
/// ```toml
/// [listener]
/// address = "0.0.0.0"
/// port = 5140
/// split_on_marker = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port (0 picks an ephemeral port)
    /// Default: 5140
    pub port: u16,

    /// Fixed receive buffer per connection (bytes)
    /// Default: 1048576 (1MB)
    pub buffer_size: usize,

    /// Listen backlog
    /// Default: 65535
    pub backlog: u32,

    /// Also split messages on a leading `<` (for senders that omit NUL)
    /// Default: false
    pub split_on_marker: bool,

    /// Enable TCP_NODELAY on accepted sockets
    /// Default: true
    pub nodelay: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 5140,
            buffer_size: 1024 * 1024,
            backlog: 65535,
            split_on_marker: false,
            nodelay: true,
        }
    }
}
