//! Error taxonomy shared by the Note Store, the Summarizer, and the API layer.
//!
//! Every component returns [`Error`]; the HTTP layer maps each variant to exactly one
//! status code in [`crate::api::ApiError`].

/// Failure categories surfaced by the service core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller fault: missing, blank, oversized, or malformed input. Never persisted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested note does not exist (or was already deleted).
    #[error("note not found: {0}")]
    NotFound(i64),

    /// The summarization upstream failed or timed out. Safe for the caller to retry.
    #[error("summarizer unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The persistence medium failed. Kept apart from upstream failures.
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else (panicked worker, poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("malformed stored value: {err}"))
    }
}

impl Error {
    /// Short machine-readable code used in wire responses and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
