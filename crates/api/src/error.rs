//! # API error mapping
//!
//! Maps the errors of the lower crates onto HTTP status codes and a JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use koban_core::notify::error::NotifyError;
use koban_scanner::error::ScannerError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// Unified API error.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or wrong bearer token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request parameters (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with the current lifecycle state (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An upstream platform refused or failed the request (502)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => {
                // details stay in the log
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

impl From<ScannerError> for ApiError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::AlreadyRunning | ScannerError::NotRunning => {
                ApiError::Conflict(err.to_string())
            }
            ScannerError::Notify(e) => e.into(),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        match &err {
            NotifyError::Config(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Upstream(err.to_string()),
        }
    }
}
