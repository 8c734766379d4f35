//! Syslog priority parsing
//!
//! RFC 3164 and RFC 5424 messages both start with `<PRI>`, where
//! `PRI = facility * 8 + severity`. The relay never rejects a message for
//! a bad header; this is used for accounting only.

use std::fmt;

use crate::{MAX_PRIORITY, ProtocolError, Result};

/// Syslog severity (RFC 5424 section 6.2.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Severity {
    /// All severities in code order
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Informational,
        Severity::Debug,
    ];

    /// Convert a numeric code (0..=7)
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(ProtocolError::InvalidSeverity(code))
    }

    /// Numeric code
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Informational => "informational",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded `<PRI>` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    /// Facility code (0..=23)
    pub facility: u8,
    /// Severity
    pub severity: Severity,
}

impl Priority {
    /// Build from a raw PRI value
    pub fn from_value(value: u8) -> Result<Self> {
        if value > MAX_PRIORITY {
            return Err(ProtocolError::InvalidPriority(format!(
                "{} exceeds {}",
                value, MAX_PRIORITY
            )));
        }
        Ok(Self {
            facility: value / 8,
            severity: Severity::from_code(value % 8)?,
        })
    }

    /// Parse the leading `<PRI>` of a message
    ///
    /// Accepts 1-3 digits without leading zeros (except `<0>`).
    pub fn parse(message: &str) -> Result<Self> {
        let rest = message
            .strip_prefix('<')
            .ok_or(ProtocolError::MissingPriority)?;
        let end = rest
            .find('>')
            .ok_or_else(|| ProtocolError::InvalidPriority("unterminated".into()))?;
        let digits = &rest[..end];

        if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::InvalidPriority(digits.to_string()));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(ProtocolError::InvalidPriority(digits.to_string()));
        }

        let value: u16 = digits
            .parse()
            .map_err(|_| ProtocolError::InvalidPriority(digits.to_string()))?;
        let value = u8::try_from(value)
            .map_err(|_| ProtocolError::InvalidPriority(digits.to_string()))?;

        Self::from_value(value)
    }

    /// Raw PRI value
    #[inline]
    pub fn value(&self) -> u8 {
        self.facility * 8 + self.severity.code()
    }
}
