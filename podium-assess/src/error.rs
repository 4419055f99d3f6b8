//! Error types for podium-assess

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upload::UploadError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Incomplete chunk set (400) - carries the exact missing indices
    #[error("Upload incomplete: {} chunk(s) missing", missing.len())]
    IncompleteUpload {
        /// Chunk indices never received
        missing: Vec<u32>,
    },

    /// Conflict (409) - e.g., session in the wrong state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// podium-common error
    #[error("Common error: {0}")]
    Common(#[from] podium_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::IncompleteUpload { missing } => (
                StatusCode::BAD_REQUEST,
                "INCOMPLETE_UPLOAD",
                format!("Missing chunks: {:?}", missing),
                Some(json!({ "missing_chunks": missing })),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
                None,
            ),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
                None,
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
                None,
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
                None,
            ),
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::SessionNotFound(id) => {
                ApiError::NotFound(format!("Upload session not found: {}", id))
            }
            UploadError::IncompleteUpload { missing } => ApiError::IncompleteUpload { missing },
            UploadError::InvalidFileType(_)
            | UploadError::FileTooLarge { .. }
            | UploadError::InvalidChunkCount(_)
            | UploadError::InvalidChunkIndex { .. }
            | UploadError::SessionNotActive { .. } => ApiError::BadRequest(err.to_string()),
            UploadError::Storage(e) => ApiError::Common(e),
            UploadError::Io(e) => ApiError::Io(e),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
