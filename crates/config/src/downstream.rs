//! Downstream configuration
//!
//! Where workers forward transformed messages, and how hard they try.

use std::time::Duration;

use serde::Deserialize;

/// Downstream TCP endpoint configuration
///
/// # Example
///
/// ```toml
/// [downstream]
/// host = "collector.internal"
/// port = 5141
/// retry_attempts = 3
/// retry_interval = "100ms"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Target host name or IP
    /// Default: "127.0.0.1"
    pub host: String,

    /// Target port (required)
    pub port: u16,

    /// Send attempts per message, including the first
    /// Default: 3
    pub retry_attempts: usize,

    /// Delay between send attempts
    /// Default: 100ms
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,

    /// Connect timeout (0 = none)
    /// Default: 0
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Write timeout (0 = none)
    /// Default: 0
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            retry_attempts: 3,
            retry_interval: Duration::from_millis(100),
            connect_timeout: Duration::ZERO,
            write_timeout: Duration::ZERO,
        }
    }
}

impl DownstreamConfig {
    /// `host:port` string for connecting
    pub fn target(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DownstreamConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_interval, Duration::from_millis(100));
        assert!(config.connect_timeout.is_zero());
        assert!(config.write_timeout.is_zero());
    }

    #[test]
    fn test_target() {
        let config = DownstreamConfig {
            host: "example.org".into(),
            port: 601,
            ..Default::default()
        };
        assert_eq!(config.target(), "example.org:601");

        let config = DownstreamConfig {
            host: "::1".into(),
            port: 601,
            ..Default::default()
        };
        assert_eq!(config.target(), "[::1]:601");
    }

    #[test]
    fn test_humantime_durations() {
        let config: DownstreamConfig =
            toml::from_str("port = 1\nretry_interval = \"1s 500ms\"\nwrite_timeout = \"5s\"").unwrap();
        assert_eq!(config.retry_interval, Duration::from_millis(1500));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
    }
}
