//! Work enumeration via `/ajax/user/{id}/profile/all`.

use crate::api::{get_body, Transport};
use crate::credentials::AccountId;
use crate::error::AnalyticsError;
use serde_json::Value;

/// Returns illustration ids followed by manga ids, each in response order.
///
/// Any failure is fatal for the run. An upstream error comes back as
/// `EnumerationFailed`; transport errors pass through unchanged.
pub fn enumerate_work_ids(
    transport: &dyn Transport,
    account_id: &AccountId,
) -> Result<Vec<String>, AnalyticsError> {
    let path = format!("/ajax/user/{}/profile/all", account_id);
    let body = get_body(transport, &path, &[]).map_err(|e| match e {
        AnalyticsError::UpstreamApplication { message } => {
            AnalyticsError::EnumerationFailed { message }
        }
        other => other,
    })?;

    let mut ids = mapping_keys(body.get("illusts"));
    ids.extend(mapping_keys(body.get("manga")));
    Ok(ids)
}

/// Keys of an id mapping. Absent, `null`, and the empty `[]` the API sends
/// for an empty group all yield nothing.
fn mapping_keys(group: Option<&Value>) -> Vec<String> {
    match group {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "tests/enumerator_tests.rs"]
mod tests;
