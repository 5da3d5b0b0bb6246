//! Storage paths used by pixiv-analytics.
//!
//! Tool-level files live under `~/.pixiv-analytics/`:
//! - `config.yaml` - Optional fetch configuration
//! - `logs/fetch-runs.jsonl` - Structured run log
//!
//! The snapshot history itself is project-local: `data/analytics_history.json`
//! relative to the working directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the tool home directory.
const ANALYTICS_DIR: &str = ".pixiv-analytics";

/// Overrides the tool home directory when set.
pub const HOME_ENV_VAR: &str = "PIXIV_ANALYTICS_HOME";

/// Default history location, relative to the working directory.
pub const DEFAULT_HISTORY_PATH: &str = "data/analytics_history.json";

/// Returns the tool home directory: `$PIXIV_ANALYTICS_HOME` or `~/.pixiv-analytics/`.
///
/// Does not create the directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn analytics_home_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(ANALYTICS_DIR))
}

/// Returns the default config path: `~/.pixiv-analytics/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(analytics_home_dir()?.join("config.yaml"))
}

/// Returns the default logs directory: `~/.pixiv-analytics/logs/`
///
/// Creates the directory if it doesn't exist.
pub fn logs_dir() -> Result<PathBuf> {
    let dir = analytics_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
#[path = "tests/analytics_paths_tests.rs"]
mod tests;
