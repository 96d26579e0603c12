use super::error::StoreError;
use crate::alert::entity::{AlertRecord, ConditionKind, Priority};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Summary
/// Audit row for one dispatched alert.
///
/// # Invariants
/// - `id` is unique (UUID v4).
/// - Written only after the dispatcher confirmed delivery, mirroring the engine commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertHistoryEntry {
    pub id: String,
    #[schema(example = "bitcoin")]
    pub subject_id: String,
    #[schema(example = "BTC")]
    pub symbol: String,
    pub kind: ConditionKind,
    pub priority: Priority,
    pub price: f64,
    pub change_24h: f64,
    pub sent_at: DateTime<Utc>,
}

impl AlertHistoryEntry {
    /// Builds the audit row for a committed record.
    pub fn from_record(
        id: String,
        record: &AlertRecord,
        symbol: &str,
        change_24h: f64,
    ) -> Self {
        Self {
            id,
            subject_id: record.subject_id.clone(),
            symbol: symbol.to_string(),
            kind: record.kind,
            priority: record.priority,
            price: record.price,
            change_24h,
            sent_at: record.sent_at,
        }
    }
}

/// # Summary
/// Durable mirror of committed alerts, read by the control surface.
///
/// # Invariants
/// - Optional collaborator: the alert core works without it.
/// - Implementations must be `Send + Sync`.
#[async_trait]
pub trait AlertHistoryStore: Send + Sync {
    /// # Summary
    /// Appends one history row.
    async fn append(&self, entry: &AlertHistoryEntry) -> Result<(), StoreError>;

    /// # Summary
    /// Returns up to `limit` most recent rows, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<AlertHistoryEntry>, StoreError>;

    /// # Summary
    /// Total number of rows held.
    async fn count(&self) -> Result<u64, StoreError>;

    /// # Summary
    /// Deletes rows sent strictly before `cutoff`.
    ///
    /// # Returns
    /// Number of deleted rows.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
