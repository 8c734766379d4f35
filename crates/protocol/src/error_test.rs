//! Tests for protocol error types

use crate::error::ProtocolError;
use crate::{Priority, Severity};

#[test]
fn test_error_display() {
    assert_eq!(
        ProtocolError::MissingPriority.to_string(),
        "missing priority header"
    );
    assert_eq!(
        ProtocolError::InvalidPriority("999".into()).to_string(),
        "invalid priority header: 999"
    );
    assert_eq!(
        ProtocolError::InvalidSeverity(9).to_string(),
        "invalid severity code 9"
    );
}

#[test]
fn test_errors_from_parsing() {
    assert_eq!(Priority::parse("no header"), Err(ProtocolError::MissingPriority));
    assert!(matches!(
        Priority::parse("<192>too big"),
        Err(ProtocolError::InvalidPriority(_))
    ));
    assert_eq!(Severity::from_code(8), Err(ProtocolError::InvalidSeverity(8)));
}
