//! Tolerant parsing of upstream detail and profile objects.
//!
//! The ajax endpoints disagree on field names and value types (numbers may
//! arrive as strings, tags as plain strings or as descriptor objects). This
//! module is the only place that looks at raw JSON; everything downstream
//! sees `WorkRecord` and `AccountStats`.

use super::types::{AccountStats, WorkRecord};
use serde_json::Value;

const FOLLOWER_KEYS: &[&str] = &[
    "/followerCount",
    "/followers",
    "/social/followerCount",
    "/social/followers",
];
const FOLLOWING_KEYS: &[&str] = &["/following", "/followingCount", "/social/following"];
const MYPIXIV_KEYS: &[&str] = &["/mypixivCount", "/mypixiv", "/social/mypixivCount"];

/// Reads a non-negative integer from a JSON number or numeric string.
pub fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Reads an identifier that may be a string or a number.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First JSON pointer in `pointers` that resolves to a non-null value.
fn first_present<'a>(obj: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| obj.pointer(p))
        .find(|v| !v.is_null())
}

/// First pointer whose value coerces to an integer, else zero.
fn count_at(obj: &Value, pointers: &[&str]) -> u64 {
    pointers
        .iter()
        .filter_map(|p| obj.pointer(p))
        .find_map(coerce_u64)
        .unwrap_or(0)
}

fn u32_at(obj: &Value, pointers: &[&str]) -> u32 {
    u32::try_from(count_at(obj, pointers)).unwrap_or(u32::MAX)
}

fn string_at(obj: &Value, pointers: &[&str]) -> Option<String> {
    first_present(obj, pointers)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Flattens any accepted tag shape into tag names, preserving order.
///
/// Accepted: `["a", "b"]`, `[{"tag": "a"}, ...]`, or `{"tags": <either>}`.
pub fn flatten_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => item.get("tag").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::Object(_) => value.get("tags").map(flatten_tags).unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Builds a `WorkRecord` from either the single-work or the batch detail shape.
///
/// `id`, `title` and `create_date` must be present; metrics default to zero.
pub fn work_record_from_detail(detail: &Value) -> Result<WorkRecord, String> {
    if !detail.is_object() {
        return Err("detail is not an object".to_string());
    }

    let id = first_present(detail, &["/illustId", "/id"])
        .and_then(coerce_id)
        .ok_or_else(|| "missing id".to_string())?;
    let title = string_at(detail, &["/illustTitle", "/title"])
        .ok_or_else(|| format!("work {} is missing a title", id))?;
    let create_date = string_at(detail, &["/createDate", "/create_date"])
        .ok_or_else(|| format!("work {} is missing createDate", id))?;

    let work_type = u8::try_from(count_at(detail, &["/illustType", "/type"])).unwrap_or(0);

    Ok(WorkRecord {
        id,
        title,
        work_type,
        create_date,
        page_count: u32_at(detail, &["/pageCount", "/page_count"]),
        width: u32_at(detail, &["/width"]),
        height: u32_at(detail, &["/height"]),
        tags: detail.get("tags").map(flatten_tags).unwrap_or_default(),
        total_view: count_at(detail, &["/viewCount", "/view_count"]),
        total_bookmarks: count_at(detail, &["/bookmarkCount", "/bookmark_count"]),
        total_comments: count_at(detail, &["/commentCount", "/comment_count"]),
        url: string_at(detail, &["/urls/small", "/url", "/urls/thumb"]).unwrap_or_default(),
    })
}

/// Normalizes a `/ajax/user/{id}?full=1` body into `AccountStats`.
///
/// Each counter tries its keys in order and falls back to zero.
pub fn account_stats_from_profile(body: &Value) -> AccountStats {
    AccountStats {
        followers: count_at(body, FOLLOWER_KEYS),
        following: count_at(body, FOLLOWING_KEYS),
        mypixiv: count_at(body, MYPIXIV_KEYS),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
