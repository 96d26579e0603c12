use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Summary
/// Point-in-time market attributes of one tracked subject, supplied per evaluation.
///
/// # Invariants
/// - Amounts are in the quote currency (USD).
/// - `change_24h` is a signed percentage (`12.5` means +12.5 %).
/// - Owned by the caller for the duration of one evaluation; nothing here persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarketSnapshot {
    // provider id, e.g. "bitcoin"
    #[schema(example = "bitcoin")]
    pub id: String,
    #[schema(example = "Bitcoin")]
    pub name: String,
    #[schema(example = "BTC")]
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
}
