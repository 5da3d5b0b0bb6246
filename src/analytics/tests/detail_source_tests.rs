use super::*;
use crate::api::fake::{batch_work, error_envelope, illust_detail, ok_envelope, FakeTransport};
use crate::credentials::extract_account_id;
use proptest::prelude::*;
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, delay: Duration) {
        self.pauses.lock().unwrap().push(delay);
    }
}

fn ids(range: std::ops::Range<u32>) -> Vec<String> {
    range.map(|i| i.to_string()).collect()
}

fn batch_source(pacer: &RecordingPacer) -> BatchDetailSource {
    BatchDetailSource::new(
        extract_account_id("4242_token").unwrap(),
        50,
        Duration::from_secs(1),
        Box::new(pacer.clone()),
    )
}

fn individual_source(pacer: &RecordingPacer) -> IndividualDetailSource {
    IndividualDetailSource::new(Duration::from_millis(500), 10, Box::new(pacer.clone()))
}

/// Answers batch requests with a `works` mapping for every requested id.
fn echo_batch(_path: &str, query: &[(&str, &str)]) -> Result<Value, AnalyticsError> {
    let mut works = Map::new();
    for (key, id) in query {
        if *key == "ids[]" {
            works.insert(id.to_string(), batch_work(id, "work"));
        }
    }
    Ok(ok_envelope(json!({ "works": works })))
}

#[test]
fn test_partition_120_into_50_50_20() {
    let batches = partition_batches(&ids(0..120), 50);
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![50, 50, 20]);
    assert_eq!(batches[1][0], "50");
}

#[test]
fn test_partition_zero_size_and_empty() {
    assert!(partition_batches(&[], 50).is_empty());
    assert_eq!(partition_batches(&ids(0..3), 0).len(), 3);
}

proptest! {
    #[test]
    fn prop_partition_preserves_order_and_bounds(n in 0u32..400, size in 1usize..80) {
        let input = ids(0..n);
        let batches = partition_batches(&input, size);
        prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
        let rejoined: Vec<String> = batches.into_iter().flatten().collect();
        prop_assert_eq!(rejoined, input);
    }
}

#[test]
fn test_batch_request_shape_and_pacing() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(echo_batch);
    let mut reports = Vec::new();

    let fetch = batch_source(&pacer).fetch_details(&transport, &ids(0..120), &mut |p| {
        reports.push(p)
    });

    assert_eq!(fetch.works.len(), 120);
    assert!(fetch.skipped.is_empty());
    assert_eq!(pacer.pauses(), vec![Duration::from_secs(1); 3]);

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].path, "/ajax/user/4242/profile/illusts");
    assert_eq!(calls[0].query_values("ids[]").len(), 50);
    assert_eq!(calls[2].query_values("ids[]").len(), 20);
    assert_eq!(calls[2].query_values("work_category"), vec!["illustManga"]);
    assert_eq!(calls[2].query_values("is_first_page"), vec!["0"]);

    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports[2],
        FetchProgress {
            fetched: 120,
            processed: 120,
            total: 120
        }
    );
}

#[test]
fn test_batch_upstream_error_skips_only_that_batch() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|path, query| {
        if query.contains(&("ids[]", "50")) {
            Ok(error_envelope("rate limited"))
        } else {
            echo_batch(path, query)
        }
    });

    let fetch = batch_source(&pacer).fetch_details(&transport, &ids(0..120), &mut |_| {});

    assert_eq!(fetch.works.len(), 70);
    assert_eq!(fetch.skipped.len(), 1);
    assert_eq!(fetch.skipped[0].ids, ids(50..100));
    assert!(fetch.skipped[0].reason.contains("rate limited"));
    assert!(fetch.works.iter().all(|w| w.id != "75"));
    assert_eq!(transport.calls().len(), 3);
}

#[test]
fn test_batch_transport_error_skips_and_continues() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|path, query| {
        if query.contains(&("ids[]", "0")) {
            Err(AnalyticsError::Transport {
                message: "HTTP 503 from /ajax".to_string(),
            })
        } else {
            echo_batch(path, query)
        }
    });

    let fetch = batch_source(&pacer).fetch_details(&transport, &ids(0..60), &mut |_| {});

    assert_eq!(fetch.works.len(), 10);
    assert_eq!(fetch.skipped[0].ids.len(), 50);
    assert!(fetch.skipped[0].reason.contains("HTTP 503"));
}

#[test]
fn test_batch_skips_incomplete_work_and_empty_mapping() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|_, query| {
        if query.contains(&("ids[]", "1")) {
            Ok(ok_envelope(json!({
                "works": {
                    "1": batch_work("1", "ok"),
                    "2": { "id": "2", "createDate": "2025-01-01" }
                }
            })))
        } else {
            Ok(ok_envelope(json!({ "works": [] })))
        }
    });
    let source = BatchDetailSource::new(
        extract_account_id("4242_token").unwrap(),
        2,
        Duration::ZERO,
        Box::new(pacer.clone()),
    );

    let fetch = source.fetch_details(&transport, &ids(1..5), &mut |_| {});

    assert_eq!(fetch.works.len(), 1);
    assert_eq!(fetch.works[0].id, "1");
    assert_eq!(fetch.skipped.len(), 1);
    assert_eq!(fetch.skipped[0].ids, vec!["2"]);
}

#[test]
fn test_individual_pacing_and_progress_every_ten() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|path, _| {
        let id = path.trim_start_matches("/ajax/illust/");
        Ok(ok_envelope(illust_detail(id, "t", 5)))
    });
    let mut reports = Vec::new();

    let fetch = individual_source(&pacer).fetch_details(&transport, &ids(0..25), &mut |p| {
        reports.push(p)
    });

    assert_eq!(fetch.works.len(), 25);
    assert_eq!(pacer.pauses(), vec![Duration::from_millis(500); 25]);
    assert_eq!(transport.calls()[3].path, "/ajax/illust/3");
    let counts: Vec<usize> = reports.iter().map(|p| p.fetched).collect();
    assert_eq!(counts, vec![10, 20]);
}

#[test]
fn test_individual_skips_upstream_and_transport_errors() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|path, _| match path {
        "/ajax/illust/1" => Ok(error_envelope("deleted")),
        "/ajax/illust/2" => Err(AnalyticsError::Transport {
            message: "timed out".to_string(),
        }),
        _ => {
            let id = path.trim_start_matches("/ajax/illust/");
            Ok(ok_envelope(illust_detail(id, "t", 1)))
        }
    });

    let fetch = individual_source(&pacer).fetch_details(&transport, &ids(0..4), &mut |_| {});

    let fetched: Vec<&str> = fetch.works.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(fetched, vec!["0", "3"]);
    assert_eq!(fetch.skipped.len(), 2);
    assert_eq!(fetch.skipped[0].ids, vec!["1"]);
    assert!(fetch.skipped[0].reason.contains("deleted"));
    assert!(fetch.skipped[1].reason.contains("timed out"));
    assert_eq!(transport.calls().len(), 4);
}

#[test]
fn test_individual_with_no_ids_makes_no_requests() {
    let pacer = RecordingPacer::default();
    let transport = FakeTransport::new(|_, _| Ok(ok_envelope(json!({}))));
    let fetch = individual_source(&pacer).fetch_details(&transport, &[], &mut |_| {});
    assert_eq!(fetch, DetailFetch::default());
    assert!(pacer.pauses().is_empty());
    assert!(transport.calls().is_empty());
}
