//! Append-only snapshot history on disk.
//!
//! The whole history lives in one JSON array. Each save reads it as raw JSON,
//! appends a snapshot and rewrites the file through a temporary sibling, so
//! earlier snapshots are written back exactly as they were read.

use super::types::{AccountStats, History, Snapshot, WorkRecord};
use crate::error::AnalyticsError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Timestamp format for snapshots: local time, microsecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// What `SnapshotStore::append` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No works were given; nothing on disk was touched.
    Skipped,
    Saved {
        path: PathBuf,
        total_snapshots: usize,
        /// Set when the previous file was unreadable and history restarted.
        recovered_from: Option<AnalyticsError>,
    },
}

/// History read from disk for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedHistory {
    pub snapshots: History,
    /// Entries kept on disk that do not fit the `Snapshot` shape.
    pub unreadable: usize,
    /// Set when the file existed but is not a JSON array.
    pub recovered_from: Option<AnalyticsError>,
}

/// Snapshot entries exactly as stored.
struct RawHistory {
    entries: Vec<Value>,
    recovered_from: Option<AnalyticsError>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the history as typed snapshots. Entries that do not parse are
    /// counted in `unreadable` and left out; they stay untouched on disk.
    ///
    /// # Errors
    ///
    /// Returns an error for I/O failures other than not-found.
    pub fn load(&self) -> Result<LoadedHistory> {
        let RawHistory {
            entries,
            recovered_from,
        } = self.load_raw()?;

        let mut snapshots = Vec::with_capacity(entries.len());
        let mut unreadable = 0;
        for entry in entries {
            match serde_json::from_value::<Snapshot>(entry) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable snapshot entry");
                    unreadable += 1;
                }
            }
        }

        Ok(LoadedHistory {
            snapshots,
            unreadable,
            recovered_from,
        })
    }

    /// A missing file is empty history. Bad JSON syntax or a top level that is
    /// not an array is reported through `recovered_from` and treated as empty.
    fn load_raw(&self) -> Result<RawHistory> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(RawHistory {
                    entries: Vec::new(),
                    recovered_from: None,
                })
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read history file: {}", self.path.display())
                })
            }
        };

        let message = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => {
                return Ok(RawHistory {
                    entries,
                    recovered_from: None,
                })
            }
            Ok(_) => "top level is not an array".to_string(),
            Err(e) => e.to_string(),
        };

        let err = AnalyticsError::PersistedStateCorrupt {
            path: self.path.display().to_string(),
            message,
        };
        tracing::warn!(error = %err, "starting a new history");
        Ok(RawHistory {
            entries: Vec::new(),
            recovered_from: Some(err),
        })
    }

    /// Appends a snapshot stamped with the current local time.
    pub fn append(&self, works: &[WorkRecord], stats: Option<AccountStats>) -> Result<SaveOutcome> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_at(works, stats, &timestamp)
    }

    /// Appends a snapshot with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the history
    /// cannot be read or written.
    pub fn append_at(
        &self,
        works: &[WorkRecord],
        stats: Option<AccountStats>,
        timestamp: &str,
    ) -> Result<SaveOutcome> {
        if works.is_empty() {
            return Ok(SaveOutcome::Skipped);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let RawHistory {
            mut entries,
            recovered_from,
        } = self.load_raw()?;

        let snapshot = Snapshot {
            timestamp: timestamp.to_string(),
            stats,
            works: works.to_vec(),
        };
        entries.push(serde_json::to_value(&snapshot).context("Failed to serialize snapshot")?);

        self.write(&entries)?;

        Ok(SaveOutcome::Saved {
            path: self.path.clone(),
            total_snapshots: entries.len(),
            recovered_from,
        })
    }

    fn write(&self, entries: &[Value]) -> Result<()> {
        let temp_path = self.temp_path()?;
        let content =
            serde_json::to_string_pretty(entries).context("Failed to serialize history")?;

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp history file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename temp file to: {}", self.path.display()))?;

        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .with_context(|| format!("History path has no file name: {}", self.path.display()))?;
        let mut temp_name = OsString::from(file_name);
        temp_name.push(".tmp");
        Ok(self.path.with_file_name(temp_name))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
