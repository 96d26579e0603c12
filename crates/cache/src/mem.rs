use async_trait::async_trait;
use dashmap::DashMap;
use koban_core::cache::error::CacheError;
use koban_core::cache::port::Cache;

/// # Summary
/// `DashMap`-backed in-memory cache.
///
/// # Invariants
/// - All operations go through the concurrent map; safe to share across tasks.
/// - No expiry or capacity limit; the scanner overwrites one entry per subject.
#[derive(Default)]
pub struct MemCache {
    storage: DashMap<String, Vec<u8>>,
}

impl MemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Cache for MemCache {
    async fn set_raw(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.storage.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.storage.get(key).map(|v| v.value().clone()))
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove(key);
        Ok(())
    }

    /// # Summary
    /// Copies every entry out of the map.
    ///
    /// # Logic
    /// 1. Clone entries shard by shard (no lock held across the await point).
    /// 2. Sort by key so callers get a stable order.
    async fn entries_raw(&self) -> Result<Vec<(String, Vec<u8>)>, CacheError> {
        let mut entries: Vec<(String, Vec<u8>)> = self
            .storage
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
