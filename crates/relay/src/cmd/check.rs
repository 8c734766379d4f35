//! Check command - Validate a configuration without starting the relay

use anyhow::{Context, Result};
use sysrelay_config::Config;
use sysrelay_transform::create_default_registry;

/// Print a summary of the loaded configuration
///
/// Loading already validated the file; this also builds the worker
/// transformer so bad regex patterns are caught before deploying.
pub fn run(config: &Config) -> Result<()> {
    let workers = &config.workers;
    let transformer = create_default_registry()
        .create(workers.kind.as_str(), &workers.params)
        .context("invalid worker configuration")?;

    let framing = if config.listener.split_on_marker {
        "NUL or '<'"
    } else {
        "NUL"
    };

    println!("configuration OK");
    println!(
        "  listen      {}:{} (framing: {})",
        config.listener.address, config.listener.port, framing
    );
    println!("  downstream  {}", config.downstream.target());
    println!(
        "  workers     {} x {}",
        workers.count,
        transformer.name()
    );
    println!(
        "  retries     {} attempts, {:?} apart",
        config.downstream.retry_attempts, config.downstream.retry_interval
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_check_accepts_valid_regex() {
        let config = Config::from_str(
            "[downstream]\nport = 601\n[workers.params.substitutions]\n\"a+\" = \"b\"",
        )
        .unwrap();
        assert!(run(&config).is_ok());
    }

    #[test]
    fn test_check_rejects_bad_pattern() {
        let config = Config::from_str(
            "[downstream]\nport = 601\n[workers.params.substitutions]\n\"(a\" = \"b\"",
        )
        .unwrap();
        let err = run(&config).unwrap_err();
        assert!(err.to_string().contains("invalid worker configuration"));
    }
}
