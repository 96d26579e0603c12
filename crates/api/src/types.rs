//! # DTO layer
//!
//! JSON shapes returned by the control surface. Every DTO derives
//! `utoipa::ToSchema` so it shows up in the Swagger document.

use chrono::{DateTime, Utc};
use koban_core::alert::entity::AlertStats;
use koban_core::whale::entity::WhaleStats;
use koban_scanner::scan::ScanStats;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  Status DTOs
// ============================================================

/// Liveness and lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Whether the scan loop is running
    pub monitoring: bool,
    /// Whale tracking configured and enabled
    pub whale_tracking: bool,
    /// Tracked subject ids
    #[schema(example = json!(["bitcoin", "ethereum"]))]
    pub subjects: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Monitoring state after a start/stop request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonitoringResponse {
    pub running: bool,
}

/// Engine, loop and whale counters in one view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub alerts: AlertStats,
    pub scan: ScanStats,
    /// Absent when whale tracking is not wired
    pub whales: Option<WhaleStats>,
}

// ============================================================
//  Request DTOs
// ============================================================

/// Optional body of `POST /api/test-notify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TestNotifyRequest {
    #[schema(example = "Hello from Koban")]
    pub message: Option<String>,
}

// ============================================================
//  Envelopes
// ============================================================

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Failure envelope (no payload).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Always false
    pub success: bool,
    pub error: String,
}

impl ApiErrorResponse {
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
