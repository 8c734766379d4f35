//! sysrelay - Syslog TCP relay
//!
//! # Usage
//!
//! ```bash
//! # Run the relay (default)
//! sysrelay
//! sysrelay --config configs/sysrelay.toml --log-level debug
//!
//! # Validate a config file and exit
//! sysrelay check --config configs/sysrelay.toml
//! ```

mod cmd;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sysrelay_config::LogLevel;

/// sysrelay - Syslog TCP relay
#[derive(Parser, Debug)]
#[command(name = "sysrelay")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay
    Serve,

    /// Validate the configuration and print a summary
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Check) => cmd::check::run(&config),
        // No subcommand = run the relay
        Some(Command::Serve) | None => {
            let level = cli.log_level.unwrap_or(config.log.level);
            logging::init(&config.log, level)?;
            cmd::serve::run(config).await
        }
    }
}
