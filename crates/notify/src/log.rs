use async_trait::async_trait;
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use tracing::info;

/// # Summary
/// Writes alerts to the log instead of an external channel.
///
/// # Invariants
/// - Never fails, so alerts routed here are always committed (dry-run deployments).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        info!(target: "koban::alerts", %subject, %content, "Alert");
        Ok(())
    }
}
