//! Unified error handling for the HTTP API.
//!
//! All route handlers return `Result<T, AppError>`; errors render as JSON
//! `{"error": "..."}` with the appropriate status code. Every store error
//! is recoverable at the client: the mobile shell shows a retry affordance.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use punchcard_core::StoreError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) | StoreError::EmptyCollection => StatusCode::NOT_FOUND,
                StoreError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                StoreError::Seed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        }

        // Don't expose internal error details to clients.
        let message = match &self {
            Self::Store(StoreError::Seed(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
