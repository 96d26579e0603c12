//! # Bearer token guard
//!
//! Control routes require `Authorization: Bearer <server.api_token>` when a
//! token is configured. An empty token leaves them open.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::server::AppState;

/// # Summary
/// Rejects requests whose bearer token does not match the configured one.
///
/// # Logic
/// 1. No configured token: pass through.
/// 2. Missing header or wrong scheme: 401.
/// 3. Token mismatch: 401.
pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.config.server.api_token.as_str();
    if expected.is_empty() {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| {
            tracing::warn!(path = %req.uri().path(), "Missing Authorization header");
            ApiError::Unauthorized("Missing Authorization header".into())
        })?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid auth header".into()))?;

    let Some(token) = header.strip_prefix("Bearer ") else {
        tracing::warn!("Invalid Bearer format");
        return Err(ApiError::Unauthorized("Invalid Bearer format".into()));
    };
    if token != expected {
        tracing::warn!(path = %req.uri().path(), "Rejected control request with wrong token");
        return Err(ApiError::Unauthorized("Invalid token".into()));
    }

    Ok(next.run(req).await)
}
