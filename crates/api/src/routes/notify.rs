use axum::Json;
use axum::extract::State;
use koban_core::common::time::TimeProvider;
use koban_core::notify::port::Notifier;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, TestNotifyRequest};

const TEST_SUBJECT: &str = "🧪 KOBAN TEST";

/// # Summary
/// Sends a test message through the configured channels.
///
/// Bypasses the decision engine: nothing is rate limited, cooled down or recorded.
#[utoipa::path(
    post,
    path = "/api/test-notify",
    tag = "Monitoring",
    security(("bearer_token" = [])),
    request_body = TestNotifyRequest,
    responses(
        (status = 200, description = "Delivered on at least one channel", body = ApiResponse<String>),
        (status = 400, description = "No channel configured"),
        (status = 502, description = "Every channel failed"),
        (status = 401, description = "Missing or wrong token")
    )
)]
pub async fn test_notify(
    State(state): State<AppState>,
    Json(req): Json<TestNotifyRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let body = req.message.unwrap_or_else(|| {
        format!(
            "Notification channels are working.\n⏰ {} UTC",
            state.clock.now().format("%H:%M:%S")
        )
    });
    state
        .service
        .scanner()
        .notifier()
        .notify(TEST_SUBJECT, &body)
        .await?;
    Ok(Json(ApiResponse::ok("sent".to_string())))
}
