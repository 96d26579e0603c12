//! In-memory port implementations for tests (`test-utils` feature).

use crate::market::entity::MarketSnapshot;
use crate::market::error::MarketError;
use crate::market::port::SnapshotSource;
use crate::notify::error::NotifyError;
use crate::notify::port::Notifier;
use crate::whale::entity::WhaleTransaction;
use crate::whale::port::WhaleSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Builds a snapshot with the given figures; name and symbol derive from `id`.
pub fn snapshot(id: &str, price: f64, change_24h: f64, volume_24h: f64, market_cap: f64) -> MarketSnapshot {
    MarketSnapshot {
        id: id.to_string(),
        name: id.to_string(),
        symbol: id.to_ascii_uppercase(),
        price,
        change_24h,
        volume_24h,
        market_cap,
        high_24h: None,
        low_24h: None,
    }
}

/// # Summary
/// Snapshot source backed by a map; subjects listed in `failing` return a network error.
#[derive(Default)]
pub struct StaticSnapshotSource {
    snapshots: DashMap<String, MarketSnapshot>,
    failing: DashSet<String>,
    calls: AtomicUsize,
}

impl StaticSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, snapshot: MarketSnapshot) {
        self.snapshots.insert(snapshot.id.clone(), snapshot);
    }

    pub fn fail(&self, subject_id: &str) {
        self.failing.insert(subject_id.to_string());
    }

    pub fn recover(&self, subject_id: &str) {
        self.failing.remove(subject_id);
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshotSource {
    async fn fetch(&self, subject_id: &str) -> Result<MarketSnapshot, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(subject_id) {
            return Err(MarketError::Network(format!("simulated outage for {}", subject_id)));
        }
        self.snapshots
            .get(subject_id)
            .map(|s| s.value().clone())
            .ok_or_else(|| MarketError::NotFound(subject_id.to_string()))
    }
}

/// # Summary
/// Notifier that records every delivered message; can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delivered `(subject, content)` pairs in send order.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Network("simulated transport failure".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((subject.to_string(), content.to_string()));
        Ok(())
    }
}

/// # Summary
/// Whale source returning a fixed batch on every poll.
#[derive(Default)]
pub struct StaticWhaleSource {
    transactions: Mutex<Vec<WhaleTransaction>>,
}

impl StaticWhaleSource {
    pub fn new(transactions: Vec<WhaleTransaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
        }
    }
}

#[async_trait]
impl WhaleSource for StaticWhaleSource {
    fn enabled(&self) -> bool {
        true
    }

    async fn recent_transactions(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        min_value_usd: u64,
        _limit: u32,
    ) -> Result<Vec<WhaleTransaction>, MarketError> {
        #[allow(clippy::cast_precision_loss)]
        let min = min_value_usd as f64;
        Ok(self
            .transactions
            .lock()
            .await
            .iter()
            .filter(|tx| tx.amount_usd >= min)
            .cloned()
            .collect())
    }
}
