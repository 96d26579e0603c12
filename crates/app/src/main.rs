mod settings;
mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use koban_alert::AlertDecisionEngine;
use koban_api::server::{AppState, start_server};
use koban_cache::mem::MemCache;
use koban_core::common::install_crypto_provider;
use koban_core::common::time::{RealTimeProvider, TimeProvider};
use koban_core::config::AppConfig;
use koban_core::notify::error::NotifyError;
use koban_core::notify::port::Notifier;
use koban_feed::coingecko::CoinGeckoProvider;
use koban_feed::whale_alert::WhaleAlertClient;
use koban_notify::dispatcher::NotificationDispatcher;
use koban_notify::email::EmailNotifier;
use koban_notify::log::LogNotifier;
use koban_notify::telegram::TelegramNotifier;
use koban_scanner::{Scanner, ScannerService};
use koban_store::history::SqliteAlertHistory;
use tokio::sync::Mutex;
use tracing::{info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// # Summary
/// Process entry point and DI container.
/// Instantiates every adapter and injects it as `Arc<dyn Port>`.
///
/// # Logic
/// 1. Load and validate configuration; start logging.
/// 2. Build the infrastructure layer (feed, channels, cache, history).
/// 3. Build the decision engine and the scanner.
/// 4. Optionally start monitoring, then serve the API until Ctrl-C.
/// 5. Stop the scan loop cleanly on the way out.
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. configuration and logging
    let config = settings::load(settings::DEFAULT_CONFIG_FILE)?;
    let log_dir = Path::new(&config.database.data_dir).join("logs");
    let _log_guard = telemetry::init(&log_dir.to_string_lossy());
    info!("Koban starting...");
    install_crypto_provider();

    // 2. infrastructure
    koban_store::config::set_root_dir(PathBuf::from(&config.database.data_dir));
    let feed = Arc::new(CoinGeckoProvider::new(&config.feed)?);
    let notifier = build_dispatcher(&config)?;
    let cache = Arc::new(MemCache::new());
    let history = Arc::new(SqliteAlertHistory::new().await?);

    // 3. decision core and scan loop
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let engine = Arc::new(Mutex::new(AlertDecisionEngine::new(
        &config.alert,
        clock.clone(),
    )));
    let mut scanner = Scanner::new(
        config.scanner.clone(),
        engine,
        feed,
        notifier,
        cache,
        history,
        clock.clone(),
    );
    if config.whale.api_key.is_empty() {
        info!("Whale tracking disabled (no whale.api_key)");
    } else {
        let whales = Arc::new(WhaleAlertClient::new(&config.whale)?);
        scanner = scanner.with_whales(whales, config.whale.clone());
        info!(min_value_usd = config.whale.min_value_usd, "Whale tracking enabled");
    }
    let service = ScannerService::new(Arc::new(scanner));

    // 4. lifecycle
    if config.scanner.autostart {
        service.start().await?;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        service: service.clone(),
        config: Arc::new(config),
        clock,
    };

    tokio::select! {
        served = start_server(state, &bind_addr) => served?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received");
        }
    }

    // 5. cooperative stop; a sent alert is always committed first
    if service.is_running().await {
        service.stop().await?;
    }
    info!("Koban stopped");
    Ok(())
}

/// # Summary
/// Builds the fan-out notifier from the configured channels.
///
/// # Logic
/// 1. Add Telegram and email when their credentials are present.
/// 2. With neither configured, fall back to the log channel (dry run).
fn build_dispatcher(config: &AppConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    let mut dispatcher = NotificationDispatcher::new();
    if config.telegram.is_configured() {
        dispatcher = dispatcher.with_channel("telegram", Arc::new(TelegramNotifier::new(&config.telegram)?));
    }
    if config.email.is_configured() {
        dispatcher = dispatcher.with_channel("email", Arc::new(EmailNotifier::new(&config.email)?));
    }
    if dispatcher.is_empty() {
        warn!("No notification channel configured, alerts go to the log only");
        dispatcher = dispatcher.with_channel("log", Arc::new(LogNotifier));
    }
    info!(channels = ?dispatcher.channel_names(), "Notification channels ready");
    Ok(Arc::new(dispatcher))
}
