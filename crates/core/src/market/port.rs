use crate::market::entity::MarketSnapshot;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// Source of market snapshots (CoinGecko in production, a static map in tests).
///
/// # Invariants
/// - Implementations own transport, auth and schema concerns; callers only see
///   the normalized `MarketSnapshot`.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// # Summary
    /// Fetches the current snapshot of one subject.
    ///
    /// # Arguments
    /// * `subject_id`: provider id of the tracked subject.
    ///
    /// # Returns
    /// The normalized snapshot, or `MarketError` on any transport/decoding failure.
    async fn fetch(&self, subject_id: &str) -> Result<MarketSnapshot, MarketError>;
}
