//! Error types for kova-preview
//!
//! Three layers: `Error` for store/config failures, `PipelineError` for the
//! preview-generation pipeline's outcome classification, and `ApiError` for
//! HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Common result type for store and config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store and configuration errors
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (serialization, malformed stored data)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Terminal classification of one preview-generation run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Lead vanished before the run started; no preview row exists
    #[error("Lead not found: {0}")]
    LeadNotFound(Uuid),

    /// Another run for the same lead is already in flight
    #[error("Generation already running for lead {0}")]
    AlreadyRunning(Uuid),

    /// Concept synthesis upstream returned 429
    #[error("Rate limited. Please try again shortly.")]
    RateLimited,

    /// Concept synthesis upstream returned 402
    #[error("AI credits exhausted. Please add funds.")]
    QuotaExhausted,

    /// Concept synthesis failed for any other upstream reason
    #[error("AI generation failed: {0}")]
    Upstream(String),

    /// Concept synthesis response could not be parsed
    #[error("AI response parse failed: {0}")]
    Parse(String),

    /// Store failure during the run
    #[error("Store error: {0}")]
    Store(#[from] Error),
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::Store(Error::Database(e))
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., generation already running for this lead
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream rate limit (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream quota exhausted (402)
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] Error),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::LeadNotFound(id) => ApiError::NotFound(format!("Lead not found: {}", id)),
            PipelineError::AlreadyRunning(_) => ApiError::Conflict(e.to_string()),
            PipelineError::RateLimited => ApiError::RateLimited(e.to_string()),
            PipelineError::QuotaExhausted => ApiError::QuotaExhausted(e.to_string()),
            PipelineError::Upstream(_) | PipelineError::Parse(_) => ApiError::Internal(e.to_string()),
            PipelineError::Store(err) => ApiError::Store(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg),
            ApiError::QuotaExhausted(msg) => (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXHAUSTED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Store(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
