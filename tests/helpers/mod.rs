#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use quicknote::api::{self, AppState};
use quicknote::db;
use quicknote::notes::{NewNote, NoteStore, Sentiment};
use quicknote::summarizer::heuristic::HeuristicSummarizer;
use quicknote::summarizer::{RawSummary, Summarizer, SummaryBackend};
use quicknote::{Error, Result};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const TEST_MAX_CHARS: usize = 20_000;

/// Fresh store over a migrated in-memory database.
pub fn test_store() -> NoteStore {
    NoteStore::new(db::open_memory_database().unwrap())
}

pub fn new_note(title: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        summary: format!("Summary of {title}."),
        tags: vec!["test".to_string()],
        sentiment: Sentiment::Neutral,
        source_text: format!("{title} source text"),
        summarizer: Some("test".to_string()),
    }
}

/// Router plus a handle on its store, so tests can check what was persisted.
pub fn test_app(backend: impl SummaryBackend + 'static) -> (Router, NoteStore) {
    test_app_with(backend, TEST_TIMEOUT, TEST_MAX_CHARS)
}

pub fn test_app_with(
    backend: impl SummaryBackend + 'static,
    timeout: Duration,
    max_text_chars: usize,
) -> (Router, NoteStore) {
    let store = test_store();
    let router = router_for(store.clone(), backend, timeout, max_text_chars);
    (router, store)
}

/// Router over a caller-prepared store, e.g. one whose database has been damaged.
pub fn router_for(
    store: NoteStore,
    backend: impl SummaryBackend + 'static,
    timeout: Duration,
    max_text_chars: usize,
) -> Router {
    let state = AppState::new(
        store,
        Summarizer::new(Arc::new(backend)),
        timeout,
        max_text_chars,
    );
    api::router(state)
}

pub fn build_request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send one request and decode the JSON body (`Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(build_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn summarize(app: &Router, text: &str) -> (StatusCode, Value) {
    let body = serde_json::json!({ "text": text }).to_string();
    send(app, "POST", "/api/summarize", Some(&body)).await
}

/// Heuristic backend that counts how often it is called.
#[derive(Clone, Default)]
pub struct CountingBackend {
    pub calls: Arc<AtomicUsize>,
}

impl CountingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn generate(&self, text: &str) -> Result<RawSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HeuristicSummarizer.analyze(text))
    }
}

/// Answers correctly, but only after `delay`.
pub struct SlowBackend {
    pub delay: Duration,
}

#[async_trait]
impl SummaryBackend for SlowBackend {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn generate(&self, text: &str) -> Result<RawSummary> {
        tokio::time::sleep(self.delay).await;
        Ok(HeuristicSummarizer.analyze(text))
    }
}

/// Always reports the upstream as unavailable.
pub struct FailingBackend;

#[async_trait]
impl SummaryBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _text: &str) -> Result<RawSummary> {
        Err(Error::UpstreamUnavailable("model is loading".into()))
    }
}

/// Returns output outside every documented range.
pub struct UnrulyBackend;

#[async_trait]
impl SummaryBackend for UnrulyBackend {
    fn name(&self) -> &'static str {
        "unruly"
    }

    async fn generate(&self, _text: &str) -> Result<RawSummary> {
        Ok(RawSummary {
            title: "   ".into(),
            summary: "A short note about groceries.".into(),
            tags: vec![
                "Groceries".into(),
                "groceries".into(),
                "  To Do!! ".into(),
                "".into(),
            ],
            sentiment: "ecstatic".into(),
        })
    }
}
