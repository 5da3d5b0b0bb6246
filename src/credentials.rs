//! Session credential handling.
//!
//! The pixiv `PHPSESSID` cookie has the shape `<account id>_<random>`, so the
//! account whose works are fetched is derived from the token itself.

use crate::error::AnalyticsError;
use std::fmt;

/// Environment variable holding the session token.
pub const SESSION_ENV_VAR: &str = "PIXIV_PHPSESSID";

/// Numeric account identifier embedded in the session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session token plus the account it belongs to.
#[derive(Clone)]
pub struct Credentials {
    session_token: String,
    account_id: AccountId,
}

impl Credentials {
    /// Builds credentials from a raw token, validating its shape.
    pub fn from_token(token: &str) -> Result<Self, AnalyticsError> {
        let account_id = extract_account_id(token)?;
        Ok(Self {
            session_token: token.to_string(),
            account_id,
        })
    }

    /// Reads the token from `PIXIV_PHPSESSID`.
    pub fn from_env() -> Result<Self, AnalyticsError> {
        let token = std::env::var(SESSION_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AnalyticsError::MissingCredential {
                variable: SESSION_ENV_VAR.to_string(),
            })?;
        Self::from_token(token.trim())
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("PHPSESSID={}", self.session_token)
    }
}

// The token is a live credential; keep it out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Extracts the account id: everything before the first `_`, digits only.
pub fn extract_account_id(token: &str) -> Result<AccountId, AnalyticsError> {
    let (candidate, _) =
        token
            .split_once('_')
            .ok_or_else(|| AnalyticsError::InvalidCredentialFormat {
                reason: "missing '_' separator".to_string(),
            })?;

    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_digit()) {
        return Err(AnalyticsError::InvalidCredentialFormat {
            reason: "account id prefix is not numeric".to_string(),
        });
    }

    Ok(AccountId(candidate.to_string()))
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
