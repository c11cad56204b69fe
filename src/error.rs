//! Error types for the ledger core and the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures while building or hashing a block.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be decoded.
    #[error("could not decode request: {0}")]
    Decode(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Decode failures answer 500 like every other failure on this API.
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
