use thiserror::Error;

/// # Summary
/// Notification transport errors.
///
/// # Invariants
/// - Any variant means the message was not delivered and nothing may be committed.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or malformed credentials / addresses
    #[error("Configuration error: {0}")]
    Config(String),

    /// The platform answered with an error (e.g. Telegram API error)
    #[error("Platform error: {0}")]
    Platform(String),
}
