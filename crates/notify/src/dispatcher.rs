use async_trait::async_trait;
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use std::sync::Arc;
use tracing::warn;

/// # Summary
/// Fans one message out to every configured channel.
///
/// # Invariants
/// - Delivery counts as confirmed when at least one channel accepted the message.
/// - Channels are tried in registration order; one failure never skips the rest.
/// - With no channel registered every send fails with `NotifyError::Config`.
#[derive(Default, Clone)]
pub struct NotificationDispatcher {
    channels: Vec<(String, Arc<dyn Notifier>)>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel under a name used in logs.
    pub fn with_channel(mut self, name: impl Into<String>, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push((name.into(), channel));
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    /// # Summary
    /// Sends to all channels.
    ///
    /// # Returns
    /// `Ok` if any channel delivered, otherwise the last channel error.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let mut delivered = 0usize;
        let mut last_error = None;
        for (name, channel) in &self.channels {
            match channel.notify(subject, content).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(channel = %name, error = %e, "Channel delivery failed");
                    last_error = Some(e);
                }
            }
        }

        if delivered > 0 {
            return Ok(());
        }
        Err(last_error.unwrap_or_else(|| {
            NotifyError::Config("no notification channel configured".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koban_core::testing::RecordingNotifier;

    #[tokio::test]
    async fn test_one_working_channel_is_enough() {
        let broken = Arc::new(RecordingNotifier::new());
        broken.set_failing(true);
        let healthy = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new()
            .with_channel("broken", broken.clone())
            .with_channel("healthy", healthy.clone());

        dispatcher.notify("subject", "body").await.unwrap();
        assert!(broken.sent().await.is_empty());
        assert_eq!(
            healthy.sent().await,
            vec![("subject".to_string(), "body".to_string())]
        );
    }

    #[tokio::test]
    async fn test_all_channels_failing_is_an_error() {
        let broken = Arc::new(RecordingNotifier::new());
        broken.set_failing(true);
        let dispatcher = NotificationDispatcher::new().with_channel("broken", broken);
        assert!(matches!(
            dispatcher.notify("s", "b").await,
            Err(NotifyError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_dispatcher_rejects() {
        let dispatcher = NotificationDispatcher::new();
        assert!(dispatcher.is_empty());
        assert!(matches!(
            dispatcher.notify("s", "b").await,
            Err(NotifyError::Config(_))
        ));
    }
}
