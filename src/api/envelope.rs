//! The ajax response envelope: `{ "error": bool, "message": string, "body": ... }`.

use super::transport::Transport;
use crate::error::AnalyticsError;
use serde_json::Value;

/// Fetches `path` and returns the envelope's `body`.
///
/// `error: true` becomes `UpstreamApplication` with the upstream message.
pub fn get_body(
    transport: &dyn Transport,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Value, AnalyticsError> {
    let envelope = transport.get_json(path, query)?;
    into_body(envelope, path)
}

pub fn into_body(mut envelope: Value, path: &str) -> Result<Value, AnalyticsError> {
    if envelope.get("error").and_then(Value::as_bool) == Some(true) {
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown error")
            .to_string();
        return Err(AnalyticsError::UpstreamApplication { message });
    }

    match envelope.get_mut("body").map(Value::take) {
        Some(body) if !body.is_null() => Ok(body),
        _ => Err(AnalyticsError::Transport {
            message: format!("Response from {} has no body", path),
        }),
    }
}

#[cfg(test)]
#[path = "tests/envelope_tests.rs"]
mod tests;
