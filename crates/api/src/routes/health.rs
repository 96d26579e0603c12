use axum::Json;
use axum::extract::State;

use koban_core::common::time::TimeProvider;

use crate::server::AppState;
use crate::types::{ApiResponse, HealthResponse};

/// Liveness probe plus monitoring state.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Status",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthResponse>)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let scanner = state.service.scanner();
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        monitoring: state.service.is_running().await,
        whale_tracking: scanner.whales_enabled(),
        subjects: scanner.config().subjects.clone(),
        timestamp: state.clock.now(),
    }))
}
