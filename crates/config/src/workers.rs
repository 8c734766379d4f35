//! Worker pool configuration
//!
//! Every worker runs the same transformation kind with the same
//! parameters. Kind-specific parameters are passed through untouched to
//! the transformer factory.
//!
//! # Example
//!
//! ```toml
//! [workers]
//! count = 4
//! kind = "regex"
//!
//! [workers.params]
//! options = ["ignore_case"]
//!
//! [workers.params.substitutions]
//! "(?P<user>user=)\\S+" = "${user}anonymous"
//! ```

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Transformation applied by every worker
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// Ordered regex substitution (default)
    #[default]
    Regex,
    /// Forward unchanged
    Noop,
}

impl WorkerKind {
    /// Name used by the transformer registry
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Noop => "noop",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Number of transform-and-forward workers
    /// Default: 1
    pub count: usize,

    /// Transformation kind
    /// Default: regex
    pub kind: WorkerKind,

    /// Delay before re-polling idle connections
    /// Default: 250ms
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Kind-specific parameters
    pub params: toml::Table,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: 1,
            kind: WorkerKind::Regex,
            poll_interval: Duration::from_millis(250),
            params: toml::Table::new(),
        }
    }
}
