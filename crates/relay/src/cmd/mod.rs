//! Command implementations for the sysrelay CLI

pub mod check;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sysrelay_config::Config;

/// Paths tried, in order, when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/sysrelay.toml", "sysrelay.toml"];

/// Load the config named on the command line, or the first default path
/// that exists
///
/// There is no usable built-in default: the downstream port must be set.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        // User explicitly provided config path - must exist
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()));
    }

    let found = DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .with_context(|| {
            format!(
                "no config file found (tried {}); pass --config",
                DEFAULT_CONFIG_PATHS.join(", ")
            )
        })?;

    Config::from_file(&found)
        .with_context(|| format!("failed to load configuration from {}", found.display()))
}
