use thiserror::Error;

/// # Summary
/// Cache errors: (de)serialization and backend failures.
#[derive(Error, Debug)]
pub enum CacheError {
    // value could not be encoded
    #[error("Serialize error: {0}")]
    Serialize(String),
    // stored bytes do not decode into the requested type
    #[error("Deserialize error: {0}")]
    Deserialize(String),
    // backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}
