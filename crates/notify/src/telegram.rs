use async_trait::async_trait;
use koban_core::config::TelegramConfig;
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use serde::Serialize;
use std::time::Duration;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// # Summary
/// A notifier implementation that sends messages via Telegram Bot API.
///
/// # Invariants
/// * `bot_token` must be valid.
/// * `chat_id` must be accessible by the bot.
/// * Messages are sent with `parse_mode = HTML`; callers escape dynamic text.
pub struct TelegramNotifier {
    /// The Bot API token.
    bot_token: String,
    /// The target Chat ID.
    chat_id: String,
    /// Bot API root, overridable for tests.
    api_base: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload structure for Telegram `sendMessage` API.
#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    /// # Summary
    /// Creates a new `TelegramNotifier`.
    ///
    /// # Arguments
    /// * `config` - Bot token and target chat.
    ///
    /// # Returns
    /// * `NotifyError::Config` if the token or chat id is missing, or the HTTP client
    ///   cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        Self::with_api_base(config, TELEGRAM_API)
    }

    /// Same as `new`, against a different Bot API root.
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            return Err(NotifyError::Config(
                "telegram bot_token and chat_id are required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// # Summary
    /// Sends a notification to the configured Telegram chat.
    ///
    /// # Logic
    /// 1. Constructs the `sendMessage` URL.
    /// 2. Formats the message with a bold subject and the content.
    /// 3. Sends a POST request to the Telegram API.
    /// 4. Non-success status is a `Platform` error carrying the API's description.
    ///
    /// # Arguments
    /// * `subject` - The subject of the notification (formatted as bold).
    /// * `content` - HTML body.
    ///
    /// # Returns
    /// * `Ok(())` once Telegram accepted the message.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let payload = TelegramMessage {
            chat_id: &self.chat_id,
            text: format!("<b>{}</b>\n{}", subject, content),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Telegram API error ({}): {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
