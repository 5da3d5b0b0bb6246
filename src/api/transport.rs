//! HTTP transport for the pixiv ajax endpoints.

use crate::credentials::Credentials;
use crate::error::AnalyticsError;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REFERER: &str = "https://www.pixiv.net/";

/// Issues GET requests and returns the decoded JSON document.
///
/// Implementations return the raw envelope; `envelope::get_body` interprets
/// the upstream error flag. Tests substitute a scripted transport.
pub trait Transport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AnalyticsError>;
}

/// `ureq`-backed transport carrying the session cookie on every request.
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
    cookie: String,
}

impl UreqTransport {
    pub fn new(credentials: &Credentials, base_url: &str, timeout: Duration) -> Self {
        // Non-2xx bodies still carry the upstream error message, so read them.
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: credentials.cookie_header(),
        }
    }
}

impl Transport for UreqTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AnalyticsError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Cookie", &self.cookie)
            .header("Referer", REFERER);
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        tracing::debug!("GET {} ({} query params)", path, query.len());

        let mut response = request.call().map_err(|e| AnalyticsError::Transport {
            message: format!("GET {} failed: {}", path, e),
        })?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AnalyticsError::Transport {
                message: format!("Failed to read response from {}: {}", path, e),
            })?;

        classify_response(status, &body, path)
    }
}

/// Turns a status code and body into a JSON document or a transport error.
///
/// A body that carries `error: true` is passed through regardless of status
/// so the caller sees the upstream message.
pub fn classify_response(status: u16, body: &str, path: &str) -> Result<Value, AnalyticsError> {
    let parsed = serde_json::from_str::<Value>(body);
    let success = (200..300).contains(&status);

    match parsed {
        Ok(value) if value.get("error").and_then(Value::as_bool) == Some(true) => Ok(value),
        _ if !success => Err(AnalyticsError::Transport {
            message: format!("HTTP {} from {}", status, path),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(AnalyticsError::Transport {
            message: format!("Malformed JSON from {}: {}", path, e),
        }),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
