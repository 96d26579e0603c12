use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, MonitoringResponse};

/// Starts the background scan loop.
#[utoipa::path(
    post,
    path = "/api/monitoring/start",
    tag = "Monitoring",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Scan loop started", body = ApiResponse<MonitoringResponse>),
        (status = 409, description = "Already running"),
        (status = 401, description = "Missing or wrong token")
    )
)]
pub async fn start(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonitoringResponse>>, ApiError> {
    state.service.start().await?;
    Ok(Json(ApiResponse::ok(MonitoringResponse { running: true })))
}

/// Stops the scan loop after the subject in progress.
#[utoipa::path(
    post,
    path = "/api/monitoring/stop",
    tag = "Monitoring",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Scan loop stopped", body = ApiResponse<MonitoringResponse>),
        (status = 409, description = "Not running"),
        (status = 401, description = "Missing or wrong token")
    )
)]
pub async fn stop(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonitoringResponse>>, ApiError> {
    state.service.stop().await?;
    Ok(Json(ApiResponse::ok(MonitoringResponse { running: false })))
}
