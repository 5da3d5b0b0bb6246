//! Structured JSONL log of fetch runs.
//!
//! Every entry carries:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - A run ID shared by all entries of one invocation
//! - The emitting component and a structured event payload

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const LOG_FILENAME: &str = "fetch-runs.jsonl";

/// Appends structured run events to `<logs_dir>/fetch-runs.jsonl`.
pub struct RunLogger {
    run_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub ts: String,
    pub run_id: String,
    pub component: String,
    pub event: Value,
}

impl RunLogger {
    /// Opens (or creates) the run log in `logs_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened for appending.
    pub fn new(run_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join(LOG_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            run_id: run_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Writes one event. Failures to write are ignored; the log is
    /// diagnostic only.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            run_id: self.run_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    pub fn log_phase(&self, phase: &str, detail: &str) {
        self.log(
            "Runner",
            serde_json::json!({
                "type": "Phase",
                "phase": phase,
                "detail": detail
            }),
        );
    }

    pub fn log_skip(&self, ids: &[String], reason: &str) {
        self.log(
            "DetailSource",
            serde_json::json!({
                "type": "Skipped",
                "ids": ids,
                "reason": reason
            }),
        );
    }

    pub fn log_saved(&self, path: &Path, total_snapshots: usize, works: usize) {
        self.log(
            "SnapshotStore",
            serde_json::json!({
                "type": "Saved",
                "path": path.display().to_string(),
                "total_snapshots": total_snapshots,
                "works": works
            }),
        );
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

/// Run id derived from the local start time, e.g. `20260117-093012`.
pub fn new_run_id() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
#[path = "tests/run_log_tests.rs"]
mod tests;
