//! Unified error handling at the HTTP boundary.
//!
//! The services below this layer are fail-fast: store failures propagate up
//! unhandled and are translated here into a generic server error. Only the
//! AI-gateway failure inside query processing has bespoke recovery, and that
//! happens in the chat service, not here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::ai::AiError;
use crate::db::StoreError;
use crate::services::DataError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// AI gateway operation failed (demo-data generation only; query
    /// processing converts gateway failures to a degraded reply instead).
    #[error("AI gateway error: {0}")]
    Gateway(#[from] AiError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated for the admin surface.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Store(err) => Self::Store(err),
            DataError::Gateway(err) => Self::Gateway(err),
        }
    }
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let status = match &self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose store details to clients
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
