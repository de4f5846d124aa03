//! Error types for the stepstream server.
//!
//! `AppError` implements `IntoResponse` so handlers can return it directly.
//! Job failures never surface here; they travel inside the event stream.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stepstream_engine::EngineError;
use thiserror::Error;

/// Application-level errors for the HTTP surface.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Engine rejected a request before any job started
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Engine(e) => {
                tracing::error!(error = %e, "Engine error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
