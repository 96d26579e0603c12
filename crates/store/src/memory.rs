use async_trait::async_trait;
use chrono::{DateTime, Utc};
use koban_core::store::error::StoreError;
use koban_core::store::port::{AlertHistoryEntry, AlertHistoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// # Summary
/// In-memory `AlertHistoryStore`, used when no database is wanted and in tests.
///
/// # Invariants
/// - Entries are kept in append order; `recent` walks them backwards.
#[derive(Default, Clone)]
pub struct MemoryAlertHistory {
    entries: Arc<RwLock<Vec<AlertHistoryEntry>>>,
}

impl MemoryAlertHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertHistoryStore for MemoryAlertHistory {
    async fn append(&self, entry: &AlertHistoryEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AlertHistoryEntry>, StoreError> {
        let guard = self.entries.read().await;
        let mut rows: Vec<AlertHistoryEntry> = guard.clone();
        // stable sort keeps append order among equal timestamps
        rows.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        rows.reverse();
        rows.truncate(limit);
        Ok(rows)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(u64::try_from(self.entries.read().await.len()).unwrap_or(u64::MAX))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|e| e.sent_at >= cutoff);
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}
