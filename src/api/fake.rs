//! Scripted `Transport` for tests.

use super::transport::Transport;
use crate::error::AnalyticsError;
use serde_json::{json, Value};
use std::cell::RefCell;

/// One request seen by `FakeTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    /// Values of every query parameter named `key`, in order.
    pub fn query_values(&self, key: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

type Handler = dyn Fn(&str, &[(&str, &str)]) -> Result<Value, AnalyticsError>;

/// Answers each request with a closure and records it.
pub struct FakeTransport {
    handler: Box<Handler>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&str, &[(&str, &str)]) -> Result<Value, AnalyticsError> + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AnalyticsError> {
        self.calls.borrow_mut().push(RecordedCall {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        (self.handler)(path, query)
    }
}

/// A successful envelope around `body`.
pub fn ok_envelope(body: Value) -> Value {
    json!({ "error": false, "message": "", "body": body })
}

/// An upstream error envelope.
pub fn error_envelope(message: &str) -> Value {
    json!({ "error": true, "message": message, "body": [] })
}

/// A detail object shaped like `/ajax/illust/{id}`.
pub fn illust_detail(id: &str, title: &str, views: u64) -> Value {
    json!({
        "illustId": id,
        "illustTitle": title,
        "illustType": 0,
        "createDate": "2025-12-01T10:00:00+09:00",
        "pageCount": 1,
        "width": 1200,
        "height": 1600,
        "tags": { "tags": [ { "tag": "オリジナル" }, { "tag": "girl" } ] },
        "viewCount": views,
        "bookmarkCount": 12,
        "commentCount": 3,
        "urls": { "small": format!("https://i.pximg.net/c/540x540_70/{}.jpg", id) }
    })
}

/// A work object shaped like the batch `profile/illusts` endpoint.
pub fn batch_work(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "illustType": "1",
        "createDate": "2025-11-20T08:30:00+09:00",
        "pageCount": "3",
        "width": 800,
        "height": 600,
        "tags": ["漫画", "test"],
        "url": format!("https://i.pximg.net/c/250x250/{}.jpg", id)
    })
}
