//! # Alert routes
//!
//! History and statistics views, plus the cleanup and counter-reset actions.

use axum::Json;
use axum::extract::{Query, State};
use koban_core::store::port::{AlertHistoryEntry, AlertHistoryStore};
use koban_scanner::scan::CleanupReport;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, StatsResponse};

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 1000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Most recent sent alerts, newest first.
#[utoipa::path(
    get,
    path = "/api/alerts/history",
    tag = "Alerts",
    params(
        ("limit" = Option<usize>, Query, description = "Number of rows, default 50, at most 1000")
    ),
    responses(
        (status = 200, description = "Alert history", body = ApiResponse<Vec<AlertHistoryEntry>>),
        (status = 400, description = "limit out of range")
    )
)]
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<AlertHistoryEntry>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }
    let rows = state
        .service
        .scanner()
        .history()
        .recent(limit)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// Decision counters, success rate, loop and whale statistics.
#[utoipa::path(
    get,
    path = "/api/alerts/stats",
    tag = "Alerts",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<StatsResponse>)
    )
)]
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let scanner = state.service.scanner();
    let alerts = scanner.engine().lock().await.stats();
    Json(ApiResponse::ok(StatsResponse {
        alerts,
        scan: scanner.scan_stats().await,
        whales: scanner.whale_stats().await,
    }))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CleanupQuery {
    pub max_age_hours: Option<u64>,
}

/// # Summary
/// Runs the cooldown sweep and history retention now.
///
/// # Arguments
/// * `max_age_hours`: cooldown age limit, defaults to `scanner.cooldown_max_age_hours`; 0 clears all.
#[utoipa::path(
    post,
    path = "/api/alerts/cleanup",
    tag = "Alerts",
    security(("bearer_token" = [])),
    params(
        ("max_age_hours" = Option<u64>, Query, description = "Cooldown age limit in hours, 0 clears all")
    ),
    responses(
        (status = 200, description = "Cleanup done", body = ApiResponse<CleanupReport>),
        (status = 401, description = "Missing or wrong token")
    )
)]
pub async fn cleanup(
    State(state): State<AppState>,
    Query(query): Query<CleanupQuery>,
) -> Json<ApiResponse<CleanupReport>> {
    let max_age = query
        .max_age_hours
        .unwrap_or(state.config.scanner.cooldown_max_age_hours);
    let report = state.service.scanner().cleanup(max_age).await;
    Json(ApiResponse::ok(report))
}

/// Zeroes the decision and whale counters. Cooldowns are kept.
#[utoipa::path(
    post,
    path = "/api/alerts/reset-stats",
    tag = "Alerts",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Counters reset", body = ApiResponse<StatsResponse>),
        (status = 401, description = "Missing or wrong token")
    )
)]
pub async fn reset_stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let scanner = state.service.scanner();
    scanner.reset_stats().await;
    let alerts = scanner.engine().lock().await.stats();
    Json(ApiResponse::ok(StatsResponse {
        alerts,
        scan: scanner.scan_stats().await,
        whales: scanner.whale_stats().await,
    }))
}
