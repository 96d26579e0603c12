use thiserror::Error;

/// # Summary
/// Persistence errors of the alert history mirror.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(String),
    /// Stored row could not be mapped back to an entity
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    /// Failed to create the data directory or open the database
    #[error("Initialization error: {0}")]
    InitError(String),
}
