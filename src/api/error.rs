use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;

/// Wire form of every failed request: `{"error": <code>, "message": <text>}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Maps an [`Error`] to exactly one HTTP status. Upstream, storage, and internal
/// details are logged here and replaced by a generic message on the wire.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::Storage(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match &self.0 {
            Error::InvalidInput(msg) => msg.clone(),
            Error::NotFound(id) => format!("note {id} not found"),
            Error::UpstreamUnavailable(_) => {
                "summarization service is unavailable, please retry".into()
            }
            Error::Storage(_) => "note storage is unavailable".into(),
            Error::Internal(_) => "internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            Error::UpstreamUnavailable(detail) => {
                tracing::warn!(error = %detail, "summarizer upstream failure");
            }
            Error::Storage(detail) => tracing::error!(error = %detail, "storage failure"),
            Error::Internal(detail) => tracing::error!(error = %detail, "internal failure"),
            Error::InvalidInput(_) | Error::NotFound(_) => {}
        }

        let body = ErrorBody {
            error: self.0.code(),
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
