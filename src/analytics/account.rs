//! Session probe and account-level counters.

use super::normalize::account_stats_from_profile;
use super::types::AccountStats;
use crate::api::{get_body, Transport};
use crate::credentials::AccountId;
use serde_json::Value;

/// Outcome of the login probe. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    LoggedIn,
    /// The server answered but did not recognize the session.
    NotLoggedIn { message: String },
    /// The probe itself failed.
    Unknown { message: String },
}

impl std::fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginStatus::LoggedIn => write!(f, "logged in"),
            LoginStatus::NotLoggedIn { message } => write!(f, "not logged in ({})", message),
            LoginStatus::Unknown { message } => write!(f, "login state unknown ({})", message),
        }
    }
}

/// Checks whether the session cookie is accepted, via `/ajax/user/extra`.
pub fn check_login(transport: &dyn Transport) -> LoginStatus {
    match transport.get_json("/ajax/user/extra", &[]) {
        Ok(envelope) => {
            if envelope.get("error").and_then(Value::as_bool) == Some(false) {
                LoginStatus::LoggedIn
            } else {
                let message = envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("session rejected")
                    .to_string();
                LoginStatus::NotLoggedIn { message }
            }
        }
        Err(err) => LoginStatus::Unknown {
            message: err.to_string(),
        },
    }
}

/// Fetches follower counters from `/ajax/user/{id}?full=1`.
///
/// Returns `None` on any failure; a run never stops over missing stats.
pub fn fetch_account_stats(
    transport: &dyn Transport,
    account_id: &AccountId,
) -> Option<AccountStats> {
    let path = format!("/ajax/user/{}", account_id);
    match get_body(transport, &path, &[("full", "1")]) {
        Ok(body) if body.is_object() => Some(account_stats_from_profile(&body)),
        Ok(_) => {
            tracing::warn!(path = %path, "profile body is not an object");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "account stats unavailable");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/account_tests.rs"]
mod tests;
