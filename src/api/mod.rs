//! HTTP API consumed by the QuickNote mobile client.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `POST` | `/api/summarize` | `201` with the persisted note |
//! | `GET` | `/api/notes` | `200` with all notes, newest first |
//! | `GET` | `/api/notes/{id}` | `200` with one note |
//! | `DELETE` | `/api/notes/{id}` | `204` |
//! | `GET` | `/api/health` | `200` with schema version and note count, `503` when the database check fails |
//!
//! Failures are mapped by [`ApiError`].

mod error;
mod handlers;

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::{HealthResponse, SummarizeRequest};

use crate::notes::NoteStore;
use crate::summarizer::Summarizer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    store: NoteStore,
    summarizer: Summarizer,
    request_timeout: Duration,
    max_text_chars: usize,
}

impl AppState {
    pub fn new(
        store: NoteStore,
        summarizer: Summarizer,
        request_timeout: Duration,
        max_text_chars: usize,
    ) -> Self {
        Self {
            store,
            summarizer,
            request_timeout,
            max_text_chars,
        }
    }
}

/// Build the router. The mobile client calls from arbitrary origins, so CORS is open.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/summarize", post(handlers::summarize))
        .route("/api/notes", get(handlers::list_notes))
        .route(
            "/api/notes/{id}",
            get(handlers::get_note).delete(handlers::delete_note),
        )
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
