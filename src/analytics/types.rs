//! Data types for the snapshot history.
//!
//! Field names match the on-disk `analytics_history.json` format.

use serde::{Deserialize, Serialize};

/// One work's state at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: String,
    pub title: String,
    /// 0 illustration, 1 manga, 2 ugoira.
    #[serde(rename = "type")]
    pub work_type: u8,
    pub create_date: String,
    pub page_count: u32,
    pub width: u32,
    pub height: u32,
    pub tags: Vec<String>,
    pub total_view: u64,
    pub total_bookmarks: u64,
    pub total_comments: u64,
    pub url: String,
}

/// Account-level counters, best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountStats {
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub mypixiv: u64,
}

/// One fetch run's result. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<AccountStats>,
    pub works: Vec<WorkRecord>,
}

/// The full persisted state: snapshots in save order.
pub type History = Vec<Snapshot>;

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
