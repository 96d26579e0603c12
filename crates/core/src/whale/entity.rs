use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// # Summary
/// Size bucket of a large-holder transfer, by USD value.
///
/// # Invariants
/// - Mega >= 50M, Large >= 10M, Medium >= 1M, Small below that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum WhaleSize {
    Mega,
    Large,
    Medium,
    Small,
}

impl WhaleSize {
    pub fn from_usd(amount_usd: f64) -> Self {
        if amount_usd >= 50_000_000.0 {
            WhaleSize::Mega
        } else if amount_usd >= 10_000_000.0 {
            WhaleSize::Large
        } else if amount_usd >= 1_000_000.0 {
            WhaleSize::Medium
        } else {
            WhaleSize::Small
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WhaleSize::Mega => "🔴 MEGA WHALE",
            WhaleSize::Large => "🟠 LARGE WHALE",
            WhaleSize::Medium => "🟡 MEDIUM WHALE",
            WhaleSize::Small => "🟢 SMALL WHALE",
        }
    }
}

impl fmt::Display for WhaleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// # Summary
/// One on-chain transfer reported by a whale tracking provider.
///
/// # Invariants
/// - `(blockchain, hash)` identifies the transfer; used for deduplication.
/// - `size` is derived from `amount_usd` via `WhaleSize::from_usd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WhaleTransaction {
    pub hash: String,
    pub blockchain: String,
    // asset ticker as reported by the provider, e.g. "btc"
    pub symbol: String,
    pub amount: f64,
    pub amount_usd: f64,
    // owner types, e.g. "exchange", "unknown"
    pub from_owner: String,
    pub to_owner: String,
    pub timestamp: DateTime<Utc>,
    // transfer, mint or burn
    pub transaction_type: String,
    pub size: WhaleSize,
}

impl WhaleTransaction {
    /// Deduplication id, `"{blockchain}_{hash}"`.
    pub fn dedup_id(&self) -> String {
        format!("{}_{}", self.blockchain, self.hash)
    }
}

/// # Summary
/// Whale tracking counters since start or last reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WhaleStats {
    pub total_detected: u64,
    pub mega: u64,
    pub large: u64,
    pub medium: u64,
    pub small: u64,
    pub total_volume_usd: f64,
    /// Ids currently remembered for deduplication
    pub tracked_transactions: usize,
}
