use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the matching core (normalizer, embedding adapter, vector index,
/// ranking, chat orchestration) and by the collaborators it consumes.
///
/// Every variant has a stable wire code via [`MatchError::kind`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("No usable profile material: resume text, GitHub activity and additional info are all empty")]
    InsufficientInput,

    #[error("Cannot embed empty or whitespace-only text")]
    EmptyInput,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid result limit: {0} (must be a positive integer)")]
    InvalidLimit(i64),

    #[error("Search could not be completed: {0}")]
    RetrievalFailed(String),

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to fetch profile activity: {0}")]
    FetchFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl MatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::InsufficientInput => "INSUFFICIENT_INPUT",
            MatchError::EmptyInput => "EMPTY_INPUT",
            MatchError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            MatchError::InvalidLimit(_) => "INVALID_LIMIT",
            MatchError::RetrievalFailed(_) => "RETRIEVAL_FAILED",
            MatchError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            MatchError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            MatchError::FetchFailed(_) => "FETCH_FAILED",
            MatchError::NotFound(_) => "NOT_FOUND",
            MatchError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Collapses downstream failures on the read path into `RetrievalFailed`.
    /// Contract violations (limits, dimensions) keep their own kind.
    pub fn into_retrieval_failure(self) -> Self {
        match self {
            MatchError::EmbeddingUnavailable(msg) | MatchError::Storage(msg) => {
                MatchError::RetrievalFailed(msg)
            }
            other => other,
        }
    }
}

impl From<sqlx::Error> for MatchError {
    fn from(e: sqlx::Error) -> Self {
        MatchError::Storage(e.to_string())
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Match(err) => {
                let status = match err {
                    MatchError::InsufficientInput => StatusCode::UNPROCESSABLE_ENTITY,
                    MatchError::EmptyInput | MatchError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
                    MatchError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    MatchError::NotFound(_) => StatusCode::NOT_FOUND,
                    MatchError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
                    MatchError::RetrievalFailed(_) | MatchError::EmbeddingUnavailable(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    MatchError::DimensionMismatch { .. } | MatchError::Storage(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let message = if status.is_server_error() {
                    tracing::error!(kind = err.kind(), "{err}");
                    match err {
                        MatchError::RetrievalFailed(_) | MatchError::EmbeddingUnavailable(_) => {
                            "The search could not be completed. Please try again shortly."
                                .to_string()
                        }
                        _ => "An internal error occurred".to_string(),
                    }
                } else {
                    err.to_string()
                };
                (status, err.kind(), message)
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
