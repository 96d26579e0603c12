use axum::Json;
use axum::extract::State;
use koban_core::market::entity::MarketSnapshot;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::ApiResponse;

/// Latest snapshot of every subject seen by the scanner, ordered by subject id.
#[utoipa::path(
    get,
    path = "/api/prices",
    tag = "Status",
    responses(
        (status = 200, description = "Cached snapshots", body = ApiResponse<Vec<MarketSnapshot>>)
    )
)]
pub async fn list_prices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MarketSnapshot>>>, ApiError> {
    let prices = state.service.scanner().prices().await?;
    Ok(Json(ApiResponse::ok(
        prices.into_iter().map(|(_, snapshot)| snapshot).collect(),
    )))
}
