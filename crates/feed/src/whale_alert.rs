use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use koban_core::config::WhaleConfig;
use koban_core::market::error::MarketError;
use koban_core::whale::entity::{WhaleSize, WhaleTransaction};
use koban_core::whale::port::WhaleSource;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// # Summary
/// Whale Alert `/transactions` client.
///
/// # Invariants
/// - Disabled while no API key is configured; a disabled client returns no transactions.
#[derive(Clone)]
pub struct WhaleAlertClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WhaleAlertClient {
    pub fn new(config: &WhaleConfig) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MarketError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// # Summary
    /// Decodes a `/transactions` body.
    ///
    /// # Logic
    /// 1. `result` other than `"success"` is reported as `Unknown` with the provider message.
    /// 2. Entries with an unrepresentable timestamp are skipped.
    /// 3. Size bucket is derived from `amount_usd`.
    pub fn parse_transactions(body: &[u8]) -> Result<Vec<WhaleTransaction>, MarketError> {
        let resp: TransactionsResponse =
            serde_json::from_slice(body).map_err(|e| MarketError::Parse(e.to_string()))?;
        if resp.result != "success" {
            return Err(MarketError::Unknown(
                resp.message.unwrap_or_else(|| format!("result={}", resp.result)),
            ));
        }

        let mut out = Vec::with_capacity(resp.transactions.len());
        for tx in resp.transactions {
            let Some(timestamp) = Utc.timestamp_opt(tx.timestamp, 0).single() else {
                warn!(hash = %tx.hash, ts = tx.timestamp, "Skipping transaction with bad timestamp");
                continue;
            };
            out.push(WhaleTransaction {
                size: WhaleSize::from_usd(tx.amount_usd),
                hash: tx.hash,
                blockchain: tx.blockchain,
                symbol: tx.symbol,
                amount: tx.amount,
                amount_usd: tx.amount_usd,
                from_owner: tx.from.owner_type,
                to_owner: tx.to.owner_type,
                timestamp,
                transaction_type: tx.transaction_type,
            });
        }
        Ok(out)
    }
}

#[derive(Deserialize, Debug)]
struct TransactionsResponse {
    result: String,
    message: Option<String>,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Deserialize, Debug)]
struct RawTransaction {
    #[serde(default)]
    blockchain: String,
    #[serde(default)]
    symbol: String,
    #[serde(default = "default_transaction_type")]
    transaction_type: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    from: RawOwner,
    #[serde(default)]
    to: RawOwner,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    amount_usd: f64,
}

#[derive(Deserialize, Debug)]
struct RawOwner {
    #[serde(default = "default_owner_type")]
    owner_type: String,
}

impl Default for RawOwner {
    fn default() -> Self {
        Self {
            owner_type: default_owner_type(),
        }
    }
}

fn default_owner_type() -> String {
    "unknown".to_string()
}

fn default_transaction_type() -> String {
    "transfer".to_string()
}

#[async_trait]
impl WhaleSource for WhaleAlertClient {
    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// # Summary
    /// Lists transfers in `[start, end]` worth at least `min_value_usd`.
    ///
    /// # Logic
    /// 1. Disabled client: empty result, no request.
    /// 2. GET `/transactions` with key, bounds and limit as query parameters.
    /// 3. 429 maps to `RateLimited`, other HTTP failures to `Network`.
    async fn recent_transactions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_value_usd: u64,
        limit: u32,
    ) -> Result<Vec<WhaleTransaction>, MarketError> {
        if !self.enabled() {
            return Ok(Vec::new());
        }

        let url = format!("{}/transactions", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.clone()),
                ("min_value", min_value_usd.to_string()),
                ("start", start.timestamp().to_string()),
                ("end", end.timestamp().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        match resp.status() {
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
        let transactions = Self::parse_transactions(&body)?;
        debug!(count = transactions.len(), "Whale transactions fetched");
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transactions() {
        let body = r#"{
            "result": "success",
            "cursor": "abc",
            "count": 2,
            "transactions": [
                {
                    "blockchain": "bitcoin", "symbol": "btc", "id": "1",
                    "transaction_type": "transfer", "hash": "h1",
                    "from": {"address": "a", "owner_type": "unknown"},
                    "to": {"address": "b", "owner": "binance", "owner_type": "exchange"},
                    "timestamp": 1700000000, "amount": 900.0, "amount_usd": 60000000.0,
                    "transaction_count": 1
                },
                {
                    "blockchain": "tron", "symbol": "usdt", "hash": "h2",
                    "transaction_type": "mint",
                    "timestamp": 1700000100, "amount": 2000000, "amount_usd": 2000000
                }
            ]
        }"#;
        let txs = WhaleAlertClient::parse_transactions(body.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].size, WhaleSize::Mega);
        assert_eq!(txs[0].to_owner, "exchange");
        assert_eq!(txs[0].dedup_id(), "bitcoin_h1");
        assert_eq!(txs[1].size, WhaleSize::Medium);
        assert_eq!(txs[1].from_owner, "unknown");
        assert_eq!(txs[1].transaction_type, "mint");
    }

    #[test]
    fn test_error_result() {
        let body = r#"{"result": "error", "message": "invalid api_key"}"#;
        assert_eq!(
            WhaleAlertClient::parse_transactions(body.as_bytes()).unwrap_err(),
            MarketError::Unknown("invalid api_key".to_string())
        );
    }

    #[tokio::test]
    async fn test_disabled_client_makes_no_request() {
        koban_core::common::install_crypto_provider();
        let client = WhaleAlertClient::new(&WhaleConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..WhaleConfig::default()
        })
        .unwrap();
        assert!(!client.enabled());
        let now = Utc::now();
        assert!(client
            .recent_transactions(now, now, 1_000_000, 10)
            .await
            .unwrap()
            .is_empty());
    }
}
