use async_trait::async_trait;
use koban_core::config::EmailConfig;
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use lettre::message::{Mailbox, Message, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// # Summary
/// A notifier implementation that sends alerts via SMTP (e.g., Gmail).
///
/// # Invariants
/// - Addresses are parsed once at construction; a bad address fails early.
/// - The `AsyncSmtpTransport` is reused for multiple notifications.
pub struct EmailNotifier {
    /// The asynchronous SMTP transport.
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// # Summary
    /// Creates a new `EmailNotifier`.
    ///
    /// # Logic
    /// 1. Parses sender and recipient.
    /// 2. Configures the relay transport (STARTTLS on 587) with credentials.
    ///
    /// # Returns
    /// * `NotifyError::Config` for an invalid host or address.
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid to address: {}", e)))?;

        let creds = Credentials::new(config.user.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| NotifyError::Config(format!("Invalid SMTP host: {}", e)))?
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }
}

/// Wraps the Telegram-style body into a minimal HTML document.
fn html_body(content: &str) -> String {
    format!(
        "<html><body style=\"font-family:sans-serif\">{}</body></html>",
        content.replace('\n', "<br>\n")
    )
}

#[async_trait]
impl Notifier for EmailNotifier {
    /// # Summary
    /// Sends one alert email.
    ///
    /// # Logic
    /// 1. Builds an HTML message with the subject and content.
    /// 2. Sends it using the configured SMTP transport.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body(content))
            .map_err(|e| NotifyError::Platform(format!("Failed to build email: {}", e)))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Network(format!("SMTP error: {}", e)))?;

        Ok(())
    }
}
