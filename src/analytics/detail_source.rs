//! Per-work detail retrieval.
//!
//! Two strategies share the `DetailSource` seam: the batch endpoint asks for
//! up to `batch_size` works per request, the individual endpoint asks for one.
//! Both pace requests through a `Pacer` and skip failures instead of aborting.

use super::normalize::work_record_from_detail;
use super::types::WorkRecord;
use crate::api::{get_body, Transport};
use crate::credentials::AccountId;
use crate::error::AnalyticsError;
use serde_json::Value;
use std::time::Duration;

/// Waits between upstream requests.
pub trait Pacer {
    fn pause(&self, delay: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// An id or group of ids that produced no work record, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFetch {
    pub ids: Vec<String>,
    pub reason: String,
}

/// Result of a detail pass: works in fetch order plus everything skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFetch {
    pub works: Vec<WorkRecord>,
    pub skipped: Vec<SkippedFetch>,
}

impl DetailFetch {
    fn skip(&mut self, ids: Vec<String>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(ids = ?ids, reason = %reason, "skipping detail fetch");
        self.skipped.push(SkippedFetch { ids, reason });
    }

    /// Parses one raw detail object, recording it as skipped when unusable.
    fn accept(&mut self, fallback_id: &str, detail: &Value) {
        match work_record_from_detail(detail) {
            Ok(work) => self.works.push(work),
            Err(reason) => self.skip(vec![fallback_id.to_string()], reason),
        }
    }
}

/// Progress notification emitted while fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Work records collected so far.
    pub fetched: usize,
    /// Ids handled so far, fetched or skipped.
    pub processed: usize,
    pub total: usize,
}

pub trait DetailSource {
    /// Fetches details for `ids`. Never fails as a whole.
    fn fetch_details(
        &self,
        transport: &dyn Transport,
        ids: &[String],
        progress: &mut dyn FnMut(FetchProgress),
    ) -> DetailFetch;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Splits `ids` into consecutive groups of at most `size`, keeping order.
///
/// A `size` of zero is treated as one.
pub fn partition_batches(ids: &[String], size: usize) -> Vec<Vec<String>> {
    ids.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

fn skip_reason(err: &AnalyticsError) -> String {
    match err {
        AnalyticsError::UpstreamApplication { message } => format!("upstream error: {}", message),
        other => other.to_string(),
    }
}

/// Fetches via `/ajax/user/{account}/profile/illusts`, many ids per request.
pub struct BatchDetailSource {
    account_id: AccountId,
    batch_size: usize,
    delay: Duration,
    pacer: Box<dyn Pacer>,
}

impl BatchDetailSource {
    pub fn new(
        account_id: AccountId,
        batch_size: usize,
        delay: Duration,
        pacer: Box<dyn Pacer>,
    ) -> Self {
        Self {
            account_id,
            batch_size,
            delay,
            pacer,
        }
    }

    fn fetch_batch(
        &self,
        transport: &dyn Transport,
        batch: &[String],
    ) -> Result<Value, AnalyticsError> {
        let path = format!("/ajax/user/{}/profile/illusts", self.account_id);
        let mut query: Vec<(&str, &str)> = batch.iter().map(|id| ("ids[]", id.as_str())).collect();
        query.push(("work_category", "illustManga"));
        query.push(("is_first_page", "0"));
        get_body(transport, &path, &query)
    }
}

impl DetailSource for BatchDetailSource {
    fn fetch_details(
        &self,
        transport: &dyn Transport,
        ids: &[String],
        progress: &mut dyn FnMut(FetchProgress),
    ) -> DetailFetch {
        let mut result = DetailFetch::default();
        let mut processed = 0;

        for batch in partition_batches(ids, self.batch_size) {
            self.pacer.pause(self.delay);
            processed += batch.len();

            match self.fetch_batch(transport, &batch) {
                Ok(body) => match body.get("works") {
                    Some(Value::Object(works)) => {
                        for (id, detail) in works {
                            result.accept(id, detail);
                        }
                    }
                    // An empty mapping comes back as `[]`.
                    Some(Value::Array(items)) if items.is_empty() => {}
                    _ => result.skip(batch, "response has no works mapping"),
                },
                Err(err) => result.skip(batch, skip_reason(&err)),
            }

            progress(FetchProgress {
                fetched: result.works.len(),
                processed,
                total: ids.len(),
            });
        }

        result
    }

    fn name(&self) -> &'static str {
        "batch"
    }
}

/// Fetches via `/ajax/illust/{id}`, one request per id.
pub struct IndividualDetailSource {
    delay: Duration,
    progress_every: usize,
    pacer: Box<dyn Pacer>,
}

impl IndividualDetailSource {
    pub fn new(delay: Duration, progress_every: usize, pacer: Box<dyn Pacer>) -> Self {
        Self {
            delay,
            progress_every: progress_every.max(1),
            pacer,
        }
    }
}

impl DetailSource for IndividualDetailSource {
    fn fetch_details(
        &self,
        transport: &dyn Transport,
        ids: &[String],
        progress: &mut dyn FnMut(FetchProgress),
    ) -> DetailFetch {
        let mut result = DetailFetch::default();

        for (index, id) in ids.iter().enumerate() {
            self.pacer.pause(self.delay);

            let path = format!("/ajax/illust/{}", id);
            let before = result.works.len();
            match get_body(transport, &path, &[]) {
                Ok(detail) => result.accept(id, &detail),
                Err(err) => result.skip(vec![id.clone()], skip_reason(&err)),
            }

            let fetched = result.works.len();
            if fetched > before && fetched % self.progress_every == 0 {
                progress(FetchProgress {
                    fetched,
                    processed: index + 1,
                    total: ids.len(),
                });
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "individual"
    }
}

#[cfg(test)]
#[path = "tests/detail_source_tests.rs"]
mod tests;
