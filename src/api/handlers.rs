use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use super::{ApiError, AppState};
use crate::error::Error;
use crate::notes::{parse_note_id, NewNote, Note};

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Stages of one summarize request. Any stage may fail; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Validating,
    Summarizing,
    Persisting,
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Summarizing => "summarizing",
            Self::Persisting => "persisting",
            Self::Completed => "completed",
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}

/// `POST /api/summarize`
///
/// The summarizer call runs under the request timeout and holds no store lock. The
/// note is written only after a summary exists, so a request dropped while
/// summarizing leaves nothing behind.
pub(super) async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let request_id = uuid::Uuid::now_v7();
    let span = tracing::info_span!("summarize", %request_id);

    async move {
        let mut stage = Stage::Received;
        match run_summarize(&state, payload, &mut stage).await {
            Ok(note) => {
                tracing::info!(
                    note_id = note.id,
                    stage = %Stage::Completed,
                    tags = note.tags.len(),
                    sentiment = %note.sentiment,
                    "note created"
                );
                Ok((StatusCode::CREATED, Json(note)))
            }
            Err(err) => {
                tracing::warn!(stage = %stage, code = err.code(), "summarize request failed");
                Err(err.into())
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_summarize(
    state: &AppState,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
    stage: &mut Stage,
) -> Result<Note, Error> {
    advance(stage, Stage::Validating);
    let Json(request) = payload.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;
    let text = request
        .text
        .ok_or_else(|| Error::InvalidInput("text is required".into()))?;
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("text must not be empty".into()));
    }
    let chars = text.chars().count();
    if chars > state.max_text_chars {
        return Err(Error::InvalidInput(format!(
            "text is {chars} characters, the limit is {}",
            state.max_text_chars
        )));
    }

    advance(stage, Stage::Summarizing);
    let summary = tokio::time::timeout(state.request_timeout, state.summarizer.summarize(&text))
        .await
        .map_err(|_| {
            Error::UpstreamUnavailable(format!(
                "summarizer did not answer within {}s",
                state.request_timeout.as_secs_f32()
            ))
        })??;

    advance(stage, Stage::Persisting);
    state
        .store
        .create(NewNote {
            title: summary.title,
            summary: summary.summary,
            tags: summary.tags,
            sentiment: summary.sentiment,
            source_text: text,
            summarizer: Some(state.summarizer.backend_name().to_string()),
        })
        .await
}

/// `GET /api/notes`, newest first.
pub(super) async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.store.list().await?;
    tracing::debug!(count = notes.len(), "notes listed");
    Ok(Json(notes))
}

/// `GET /api/notes/{id}`
pub(super) async fn get_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&raw_id)?;
    Ok(Json(state.store.get(id).await?))
}

/// `DELETE /api/notes/{id}`. The id format is checked before the store is touched.
pub(super) async fn delete_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_note_id(&raw_id)?;
    state.store.delete(id).await?;
    tracing::info!(note_id = id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<u64>,
    summarizer: &'static str,
}

/// `GET /api/health`. Any failed database check, including one that cannot run at
/// all, is reported as `503`.
pub(super) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let summarizer = state.summarizer.backend_name();
    let degraded = |schema_version, notes| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                schema_version,
                notes,
                summarizer,
            }),
        )
    };

    match state.store.health().await {
        Ok(report) if report.integrity_ok => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                schema_version: Some(report.schema_version),
                notes: Some(report.note_count),
                summarizer,
            }),
        ),
        Ok(report) => {
            tracing::error!(details = %report.integrity_details, "database integrity check failed");
            degraded(Some(report.schema_version), Some(report.note_count))
        }
        Err(err) => {
            tracing::error!(error = %err, "database health check failed");
            degraded(None, None)
        }
    }
}
