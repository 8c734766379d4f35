//! sysrelay Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Only the downstream port has no default; everything else can be left out.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use sysrelay_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[downstream]\nport = 5141").unwrap();
//! assert_eq!(config.workers.count, 1);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [listener]
//! port = 5140
//!
//! [downstream]
//! host = "collector.internal"
//! port = 5141
//!
//! [workers]
//! count = 4
//! kind = "regex"
//!
//! [workers.params.substitutions]
//! "password=\\S+" = "password=***"
//! ```

mod downstream;
mod error;
mod listener;
mod logging;
mod reporting;
mod validation;
mod workers;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use downstream::DownstreamConfig;
pub use error::{ConfigError, Result};
pub use listener::ListenerConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use reporting::ErrorReportConfig;
pub use workers::{WorkerKind, WorkersConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Inbound TCP listener
    pub listener: ListenerConfig,

    /// Downstream TCP endpoint that workers forward to
    pub downstream: DownstreamConfig,

    /// Worker pool and transformation
    pub workers: WorkersConfig,

    /// Periodic error reporting
    pub errors: ErrorReportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
