use koban_core::cache::error::CacheError;
use koban_core::notify::error::NotifyError;
use koban_core::store::error::StoreError;
use thiserror::Error;

/// # Summary
/// Scanner-layer error type.
#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("Scan loop already running")]
    AlreadyRunning,
    #[error("Scan loop not running")]
    NotRunning,
}
