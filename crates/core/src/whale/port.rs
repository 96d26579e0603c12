use crate::market::error::MarketError;
use crate::whale::entity::WhaleTransaction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// # Summary
/// Provider of large on-chain transfers.
///
/// # Invariants
/// - A disabled source (no credentials) returns an empty list instead of an error.
#[async_trait]
pub trait WhaleSource: Send + Sync {
    /// Whether the source is configured and will be polled.
    fn enabled(&self) -> bool;

    /// # Summary
    /// Lists transfers in `[start, end]` worth at least `min_value_usd`.
    ///
    /// # Arguments
    /// * `start`, `end`: time range of the query.
    /// * `min_value_usd`: lower bound on transfer value.
    /// * `limit`: maximum number of results.
    async fn recent_transactions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_value_usd: u64,
        limit: u32,
    ) -> Result<Vec<WhaleTransaction>, MarketError>;
}
