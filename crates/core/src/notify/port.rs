use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// Outbound message transport (the dispatcher of approved alerts).
///
/// # Invariants
/// - Implementations must be `Send` and `Sync` to support concurrent calls.
/// - `Ok(())` means the platform confirmed delivery; callers commit alert state
///   only on `Ok`.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// Sends a notification with a subject line and an HTML-light body.
    ///
    /// # Logic
    /// 1. Adapt subject and body to the platform's markup.
    /// 2. Send through the underlying transport.
    /// 3. Map any platform failure to `NotifyError`.
    ///
    /// # Arguments
    /// * `subject` - headline of the notification.
    /// * `content` - body of the notification.
    ///
    /// # Returns
    /// * `Ok(())` on confirmed delivery.
    /// * `Err(NotifyError)` otherwise.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;
}
