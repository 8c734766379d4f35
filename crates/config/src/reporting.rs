//! Error report configuration

use std::time::Duration;

use serde::Deserialize;

/// How the binary surfaces buffered delivery and transform errors
///
/// ```toml
/// [errors]
/// report_interval = "10s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorReportConfig {
    /// Interval between logging and clearing buffered errors (0 = never)
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub report_interval: Duration,
}

impl Default for ErrorReportConfig {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(10),
        }
    }
}

impl ErrorReportConfig {
    /// Whether periodic reporting is on
    pub fn is_enabled(&self) -> bool {
        !self.report_interval.is_zero()
    }
}
