use crate::analytics_paths;
use crate::error::AnalyticsError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How per-work details are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Fixed-size groups of ids per request.
    #[default]
    Batch,
    /// One request per work.
    Individual,
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Individual => write!(f, "individual"),
        }
    }
}

/// Settings for a fetch run. Every key is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub strategy: FetchStrategy,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause before each batch request.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Pause before each single-work request.
    #[serde(default = "default_individual_delay_ms")]
    pub individual_delay_ms: u64,
    /// Individual strategy reports progress after this many works.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Record follower stats alongside the works.
    #[serde(default = "default_true")]
    pub include_stats: bool,
    /// Probe the session before fetching (observational).
    #[serde(default = "default_true")]
    pub check_login: bool,
    /// Directory for the JSONL run log; defaults to `~/.pixiv-analytics/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_batch_size() -> usize {
    50
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_individual_delay_ms() -> u64 {
    500
}

fn default_progress_every() -> usize {
    10
}

fn default_history_path() -> PathBuf {
    PathBuf::from(analytics_paths::DEFAULT_HISTORY_PATH)
}

fn default_base_url() -> String {
    "https://www.pixiv.net".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::default(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            individual_delay_ms: default_individual_delay_ms(),
            progress_every: default_progress_every(),
            history_path: default_history_path(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            include_stats: true,
            check_login: true,
            log_dir: None,
        }
    }
}

impl FetchConfig {
    /// Loads and validates a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AnalyticsError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, else `~/.pixiv-analytics/config.yaml` when it
    /// exists, else the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match analytics_paths::config_path() {
            Ok(default_path) if default_path.is_file() => Self::load(&default_path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let invalid = |message: &str| AnalyticsError::InvalidConfig {
            message: message.to_string(),
        };
        if self.batch_size == 0 {
            return Err(invalid("batch_size must be at least 1"));
        }
        if self.progress_every == 0 {
            return Err(invalid("progress_every must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be at least 1"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("base_url must start with http:// or https://"));
        }
        if self.history_path.as_os_str().is_empty() {
            return Err(invalid("history_path must not be empty"));
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn individual_delay(&self) -> Duration {
        Duration::from_millis(self.individual_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
