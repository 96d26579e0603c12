use crate::cache::error::CacheError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// # Summary
/// Async byte-level KV store (port). Holds the latest snapshot per subject.
///
/// # Invariants
/// - Works on raw bytes so the trait stays object safe.
/// - No expiry; callers overwrite or delete.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    async fn set_raw(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Reads the bytes under `key`.
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Removes `key`. Missing keys are not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// # Summary
    /// Snapshot of every entry.
    ///
    /// # Returns
    /// `(key, bytes)` pairs sorted by key.
    async fn entries_raw(&self) -> Result<Vec<(String, Vec<u8>)>, CacheError>;
}

/// # Summary
/// Typed JSON helpers over `Cache`.
///
/// # Invariants
/// - Blanket-implemented for every `Cache`.
#[async_trait]
pub trait CacheExt: Cache {
    /// Stores `value` as JSON.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialize(e.to_string()))?;
        self.set_raw(key, bytes).await
    }

    /// Loads and decodes the JSON under `key`.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let val = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Deserialize(e.to_string()))?;
                Ok(Some(val))
            }
            None => Ok(None),
        }
    }

    /// # Summary
    /// Decodes every entry as `T`.
    ///
    /// # Logic
    /// 1. Read all raw entries.
    /// 2. Decode each one; the first undecodable entry aborts with `Deserialize`.
    async fn values<T: DeserializeOwned + Send>(&self) -> Result<Vec<(String, T)>, CacheError> {
        self.entries_raw()
            .await?
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes)
                    .map(|val| (key, val))
                    .map_err(|e| CacheError::Deserialize(e.to_string()))
            })
            .collect()
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
