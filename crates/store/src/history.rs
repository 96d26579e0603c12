use async_trait::async_trait;
use chrono::{DateTime, Utc};
use koban_core::alert::entity::{ConditionKind, Priority};
use koban_core::store::error::StoreError;
use koban_core::store::port::{AlertHistoryEntry, AlertHistoryStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;

/// Default history database file under the data root
const DEFAULT_HISTORY_DB: &str = "alerts.db";

type HistoryRow = (String, String, String, String, String, f64, f64, DateTime<Utc>);

/// # Summary
/// `AlertHistoryStore` backed by SQLite (`alerts.db`).
///
/// # Invariants
/// * The schema is created when the store is opened.
/// * Kind and priority are stored by their stable names (`PUMP`, `HIGH`, ...).
pub struct SqliteAlertHistory {
    pool: SqlitePool,
}

impl SqliteAlertHistory {
    /// # Summary
    /// Opens `alerts.db` under the configured data root.
    ///
    /// # Logic
    /// 1. Ensure the root directory exists.
    /// 2. Open (or create) the database and initialize the schema.
    pub async fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        fs::create_dir_all(&root).map_err(|e| StoreError::InitError(e.to_string()))?;
        Self::open(&root.join(DEFAULT_HISTORY_DB)).await
    }

    /// Opens the database at an explicit path.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alert_history (
                id TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                kind TEXT NOT NULL,
                priority TEXT NOT NULL,
                price REAL NOT NULL,
                change_24h REAL NOT NULL,
                sent_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_alert_history_sent_at
                ON alert_history (sent_at);
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        Ok(Self { pool })
    }

    fn decode(row: HistoryRow) -> Result<AlertHistoryEntry, StoreError> {
        let (id, subject_id, symbol, kind, priority, price, change_24h, sent_at) = row;
        let kind: ConditionKind = kind
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {}", id, e)))?;
        let priority: Priority = priority
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {}", id, e)))?;
        Ok(AlertHistoryEntry {
            id,
            subject_id,
            symbol,
            kind,
            priority,
            price,
            change_24h,
            sent_at,
        })
    }
}

#[async_trait]
impl AlertHistoryStore for SqliteAlertHistory {
    async fn append(&self, entry: &AlertHistoryEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO alert_history (id, subject_id, symbol, kind, priority, price, change_24h, sent_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.subject_id)
        .bind(&entry.symbol)
        .bind(entry.kind.as_str())
        .bind(entry.priority.as_str())
        .bind(entry.price)
        .bind(entry.change_24h)
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// # Summary
    /// Newest rows first; ties on `sent_at` fall back to insertion order.
    async fn recent(&self, limit: usize) -> Result<Vec<AlertHistoryEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        sqlx::query_as::<_, HistoryRow>(
            "SELECT id, subject_id, symbol, kind, priority, price, change_24h, sent_at \
             FROM alert_history ORDER BY sent_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?
        .into_iter()
        .map(Self::decode)
        .collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alert_history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM alert_history WHERE sent_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
