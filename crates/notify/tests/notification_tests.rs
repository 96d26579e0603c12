use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use koban_core::config::{EmailConfig, TelegramConfig};
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use koban_notify::email::EmailNotifier;
use koban_notify::telegram::TelegramNotifier;
use serde_json::Value;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

type Captured = Arc<Mutex<Vec<(String, Value)>>>;

async fn send_message(
    State(captured): State<Captured>,
    Path(bot): Path<String>,
    Json(payload): Json<Value>,
) -> (StatusCode, String) {
    if bot == "botrevoked" {
        return (
            StatusCode::UNAUTHORIZED,
            r#"{"ok":false,"description":"Unauthorized"}"#.to_string(),
        );
    }
    captured.lock().await.push((bot, payload));
    (StatusCode::OK, r#"{"ok":true}"#.to_string())
}

async fn spawn_bot_api() -> anyhow::Result<(String, Captured)> {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/{bot}/sendMessage", post(send_message))
        .with_state(captured.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok((addr, captured))
}

fn tg(token: &str) -> TelegramConfig {
    TelegramConfig {
        bot_token: token.to_string(),
        chat_id: "42".to_string(),
    }
}

#[tokio::test]
async fn test_telegram_sends_html_payload() -> anyhow::Result<()> {
    koban_core::common::install_crypto_provider();
    let (base, captured) = spawn_bot_api().await?;
    let notifier = TelegramNotifier::with_api_base(&tg("T0KEN"), &base)?;

    notifier.notify("⚡ PUMP DETECTED", "🟡 MEDIUM\nbody").await?;

    let captured = captured.lock().await;
    assert_eq!(captured.len(), 1);
    let (bot, payload) = &captured[0];
    assert_eq!(bot, "botT0KEN");
    assert_eq!(payload["chat_id"], "42");
    assert_eq!(payload["parse_mode"], "HTML");
    assert_eq!(payload["text"], "<b>⚡ PUMP DETECTED</b>\n🟡 MEDIUM\nbody");
    Ok(())
}

#[tokio::test]
async fn test_telegram_rejection_is_platform_error() -> anyhow::Result<()> {
    koban_core::common::install_crypto_provider();
    let (base, _) = spawn_bot_api().await?;
    let notifier = TelegramNotifier::with_api_base(&tg("revoked"), &base)?;
    let err = notifier.notify("s", "b").await.unwrap_err();
    assert!(matches!(err, NotifyError::Platform(ref m) if m.contains("Unauthorized")));
    Ok(())
}

#[test]
fn test_telegram_requires_credentials() {
    assert!(matches!(
        TelegramNotifier::new(&TelegramConfig::default()),
        Err(NotifyError::Config(_))
    ));
}

/// # Summary
/// Sends a real Telegram message.
///
/// # Logic
/// 1. Load `.env`.
/// 2. Read `KOBAN_TG_BOT_TOKEN` and `KOBAN_TG_CHAT_ID`.
/// 3. Send a test message and assert success.
#[tokio::test]
#[ignore] // needs real credentials
async fn test_telegram_notification() {
    dotenvy::dotenv().ok();
    koban_core::common::install_crypto_provider();
    let config = TelegramConfig {
        bot_token: env::var("KOBAN_TG_BOT_TOKEN").expect("KOBAN_TG_BOT_TOKEN must be set"),
        chat_id: env::var("KOBAN_TG_CHAT_ID").expect("KOBAN_TG_CHAT_ID must be set"),
    };

    let notifier = TelegramNotifier::new(&config).unwrap();
    let result = notifier
        .notify("Koban test", "Message from the Telegram integration test")
        .await;

    assert!(result.is_ok(), "Telegram notification failed: {:?}", result);
}

/// # Summary
/// Sends a real email through the configured SMTP relay.
#[tokio::test]
#[ignore] // needs real credentials
async fn test_email_notification() {
    dotenvy::dotenv().ok();
    koban_core::common::install_crypto_provider();
    let config = EmailConfig {
        host: env::var("KOBAN_EMAIL_HOST").expect("KOBAN_EMAIL_HOST must be set"),
        user: env::var("KOBAN_EMAIL_USER").expect("KOBAN_EMAIL_USER must be set"),
        password: env::var("KOBAN_EMAIL_PASS").expect("KOBAN_EMAIL_PASS must be set"),
        from: env::var("KOBAN_EMAIL_FROM").expect("KOBAN_EMAIL_FROM must be set"),
        to: env::var("KOBAN_EMAIL_TO").expect("KOBAN_EMAIL_TO must be set"),
    };

    let notifier = EmailNotifier::new(&config).unwrap();
    let result = notifier
        .notify("Koban test", "Message from the <b>email</b> integration test")
        .await;

    assert!(result.is_ok(), "Email notification failed: {:?}", result);
}
