//! Error taxonomy for a fetch run.

use std::fmt::{Display, Formatter};

/// Failures a fetch run can report.
///
/// Detail-level transport and upstream failures are scoped to a single id or
/// batch and never surface here as fatal; they are recorded as skips instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// `PIXIV_PHPSESSID` is not set.
    MissingCredential { variable: String },
    /// The session token does not start with `<digits>_`.
    InvalidCredentialFormat { reason: String },
    /// Network failure, non-success status, or a body that is not JSON.
    Transport { message: String },
    /// The API answered with its own `error: true` flag.
    UpstreamApplication { message: String },
    /// The history file exists but cannot be parsed.
    PersistedStateCorrupt { path: String, message: String },
    /// Work enumeration failed; the run cannot continue.
    EnumerationFailed { message: String },
    /// The configuration file or flags are invalid.
    InvalidConfig { message: String },
}

impl AnalyticsError {
    /// Process exit code for errors that end the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredential { .. }
            | Self::InvalidCredentialFormat { .. }
            | Self::InvalidConfig { .. } => 2,
            Self::EnumerationFailed { .. } => 3,
            Self::Transport { .. }
            | Self::UpstreamApplication { .. }
            | Self::PersistedStateCorrupt { .. } => 1,
        }
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential { variable } => write!(f, "{} is not set", variable),
            Self::InvalidCredentialFormat { reason } => {
                write!(f, "invalid session token format: {}", reason)
            }
            Self::Transport { message } => write!(f, "transport error: {}", message),
            Self::UpstreamApplication { message } => write!(f, "API error: {}", message),
            Self::PersistedStateCorrupt { path, message } => {
                write!(f, "history file {} is unreadable: {}", path, message)
            }
            Self::EnumerationFailed { message } => {
                write!(f, "failed to enumerate works: {}", message)
            }
            Self::InvalidConfig { message } => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for AnalyticsError {}

/// Maps an `anyhow` error chain to a process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AnalyticsError>())
        .map(AnalyticsError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
