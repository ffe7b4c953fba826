//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Authentication failed. Deliberately carries no cause: a missing,
    /// malformed, expired, or revoked session all look identical to the
    /// client.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A storage or archive-store collaborator failed. Transient; safe to
    /// retry.
    #[error("collaborator error: {0}")]
    Storage(#[from] shelfmark_store::StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_error"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = self.to_string();

        match &self {
            ServerError::Storage(_) | ServerError::Internal(_) => {
                tracing::error!(status = %status, code, error = %message, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
