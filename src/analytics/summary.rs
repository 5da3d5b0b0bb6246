//! Per-snapshot totals for the `history` listing.

use super::types::Snapshot;

/// One line of the `history` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub timestamp: String,
    pub works: usize,
    pub total_views: u64,
    pub total_bookmarks: u64,
    pub followers: Option<u64>,
}

impl std::fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}  works={}  views={}  bookmarks={}",
            self.timestamp, self.works, self.total_views, self.total_bookmarks
        )?;
        if let Some(followers) = self.followers {
            write!(f, "  followers={}", followers)?;
        }
        Ok(())
    }
}

/// Per-snapshot totals, in history order.
pub fn summarize(history: &[Snapshot]) -> Vec<SummaryRow> {
    history
        .iter()
        .map(|snapshot| SummaryRow {
            timestamp: snapshot.timestamp.clone(),
            works: snapshot.works.len(),
            total_views: snapshot
                .works
                .iter()
                .map(|w| w.total_view)
                .fold(0u64, u64::saturating_add),
            total_bookmarks: snapshot
                .works
                .iter()
                .map(|w| w.total_bookmarks)
                .fold(0u64, u64::saturating_add),
            followers: snapshot.stats.map(|s| s.followers),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/summary_tests.rs"]
mod tests;
