//! Configuration validation
//!
//! Checks values serde cannot:
//! - Listener address is an IP address, buffer size is non-zero
//! - Downstream host and port are set, at least one send attempt
//! - At least one worker, non-zero poll interval
//!
//! Regex patterns are compiled (and rejected) when the server builds its
//! workers, not here.

use std::net::IpAddr;

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_listener(config)?;
    validate_downstream(config)?;
    validate_workers(config)?;
    Ok(())
}

fn validate_listener(config: &Config) -> Result<()> {
    let listener = &config.listener;

    if listener.address.parse::<IpAddr>().is_err() {
        return Err(ConfigError::invalid_value(
            "listener",
            "address",
            format!("'{}' is not an IP address", listener.address),
        ));
    }

    if listener.buffer_size == 0 {
        return Err(ConfigError::invalid_value(
            "listener",
            "buffer_size",
            "must be greater than 0",
        ));
    }

    if listener.backlog == 0 {
        return Err(ConfigError::invalid_value(
            "listener",
            "backlog",
            "must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_downstream(config: &Config) -> Result<()> {
    let downstream = &config.downstream;

    if downstream.host.trim().is_empty() {
        return Err(ConfigError::missing_field("downstream", "host"));
    }

    if downstream.port == 0 {
        return Err(ConfigError::missing_field("downstream", "port"));
    }

    if downstream.retry_attempts == 0 {
        return Err(ConfigError::invalid_value(
            "downstream",
            "retry_attempts",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_workers(config: &Config) -> Result<()> {
    let workers = &config.workers;

    if workers.count == 0 {
        return Err(ConfigError::invalid_value(
            "workers",
            "count",
            "must be at least 1",
        ));
    }

    if workers.poll_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "workers",
            "poll_interval",
            "must be greater than 0",
        ));
    }

    Ok(())
}
