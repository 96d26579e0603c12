use async_trait::async_trait;
use koban_core::config::FeedConfig;
use koban_core::market::entity::MarketSnapshot;
use koban_core::market::error::MarketError;
use koban_core::market::port::SnapshotSource;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// CoinGecko `/coins/{id}` snapshot provider.
///
/// # Invariants
/// - One request per `fetch`; no caching here (the scanner keeps the price cache).
/// - A non-empty API key is sent as `x-cg-pro-api-key`.
#[derive(Clone)]
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinGeckoProvider {
    /// # Summary
    /// Builds the HTTP client from the feed settings.
    ///
    /// # Returns
    /// `MarketError::Unknown` if the TLS backend cannot be initialized.
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("koban/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// # Summary
    /// Decodes a `/coins/{id}` body into a snapshot.
    ///
    /// # Logic
    /// 1. USD price is mandatory; a missing one is a parse error.
    /// 2. Missing change, volume or market cap default to 0 and are left to the quality filter.
    pub fn parse_coin(subject_id: &str, body: &[u8]) -> Result<MarketSnapshot, MarketError> {
        let coin: CoinResponse =
            serde_json::from_slice(body).map_err(|e| MarketError::Parse(e.to_string()))?;
        let market = coin.market_data.unwrap_or_default();
        let price = market
            .current_price
            .usd
            .ok_or_else(|| MarketError::Parse(format!("no USD price for {}", subject_id)))?;

        Ok(MarketSnapshot {
            id: subject_id.to_string(),
            name: coin.name,
            symbol: coin.symbol.to_uppercase(),
            price,
            change_24h: market.price_change_percentage_24h.unwrap_or(0.0),
            volume_24h: market.total_volume.usd.unwrap_or(0.0),
            market_cap: market.market_cap.usd.unwrap_or(0.0),
            high_24h: market.high_24h.usd,
            low_24h: market.low_24h.usd,
        })
    }
}

#[derive(Deserialize, Debug)]
struct CoinResponse {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    market_data: Option<CoinMarketData>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CoinMarketData {
    current_price: UsdValue,
    price_change_percentage_24h: Option<f64>,
    total_volume: UsdValue,
    market_cap: UsdValue,
    high_24h: UsdValue,
    low_24h: UsdValue,
}

// CoinGecko quotes every figure per currency; only USD is read
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct UsdValue {
    usd: Option<f64>,
}

#[async_trait]
impl SnapshotSource for CoinGeckoProvider {
    /// # Summary
    /// Fetches the current snapshot of `subject_id`.
    ///
    /// # Logic
    /// 1. GET `/coins/{id}` without tickers, localization or developer data.
    /// 2. 404 maps to `NotFound`, 429 to `RateLimited`, other failures to `Network`.
    /// 3. Decode via `parse_coin`.
    async fn fetch(&self, subject_id: &str) -> Result<MarketSnapshot, MarketError> {
        let url = format!("{}/coins/{}", self.base_url, subject_id);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ]);
        if !self.api_key.is_empty() {
            request = request.header("x-cg-pro-api-key", &self.api_key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(MarketError::NotFound(subject_id.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(MarketError::RateLimited),
            status if !status.is_success() => {
                return Err(MarketError::Network(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        let snapshot = Self::parse_coin(subject_id, &body)?;
        debug!(
            subject = subject_id,
            price = snapshot.price,
            change = snapshot.change_24h,
            "Snapshot fetched"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "market_data": {
            "current_price": {"usd": 64000.5, "eur": 59000.0},
            "price_change_percentage_24h": -2.5,
            "total_volume": {"usd": 31000000000},
            "market_cap": {"usd": 1260000000000},
            "high_24h": {"usd": 65500},
            "low_24h": {"usd": 63000}
        }
    }"#;

    #[test]
    fn test_parse_coin() {
        let s = CoinGeckoProvider::parse_coin("bitcoin", BITCOIN.as_bytes()).unwrap();
        assert_eq!(s.id, "bitcoin");
        assert_eq!(s.symbol, "BTC");
        assert_eq!(s.name, "Bitcoin");
        assert_eq!(s.price, 64000.5);
        assert_eq!(s.change_24h, -2.5);
        assert_eq!(s.volume_24h, 31_000_000_000.0);
        assert_eq!(s.market_cap, 1_260_000_000_000.0);
        assert_eq!(s.high_24h, Some(65500.0));
    }

    #[test]
    fn test_parse_coin_null_change_defaults_to_zero() {
        let body = r#"{"symbol":"x","name":"X","market_data":{
            "current_price":{"usd":1.0},"price_change_percentage_24h":null}}"#;
        let s = CoinGeckoProvider::parse_coin("x", body.as_bytes()).unwrap();
        assert_eq!(s.change_24h, 0.0);
        assert_eq!(s.volume_24h, 0.0);
        assert_eq!(s.low_24h, None);
    }

    #[test]
    fn test_parse_coin_without_price_fails() {
        let body = r#"{"symbol":"x","name":"X","market_data":{}}"#;
        assert!(matches!(
            CoinGeckoProvider::parse_coin("x", body.as_bytes()),
            Err(MarketError::Parse(_))
        ));
        assert!(matches!(
            CoinGeckoProvider::parse_coin("x", b"not json"),
            Err(MarketError::Parse(_))
        ));
    }
}
