use crate::alert::entity::Priority;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// # Summary
/// Configuration rejected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scanner: ScannerConfig,
    pub alert: AlertConfig,
    pub feed: FeedConfig,
    pub whale: WhaleConfig,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required by mutating control routes; empty disables the check
    pub api_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// Scan loop pacing and housekeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Provider ids of the tracked subjects
    pub subjects: Vec<String>,
    /// Sleep between two full cycles
    pub cycle_interval_secs: u64,
    /// Sleep between two subjects, keeps us under the provider's rate limit
    pub subject_delay_secs: u64,
    /// Transport failures within one cycle that trigger the backoff
    pub failure_burst: u32,
    /// Sleep after a failure burst before the cycle restarts
    pub failure_backoff_secs: u64,
    /// How often the cooldown sweep and history retention run
    pub cleanup_interval_secs: u64,
    pub cooldown_max_age_hours: u64,
    pub history_retention_days: u64,
    /// Start scanning as soon as the process is up
    pub autostart: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            subjects: ["bitcoin", "ethereum", "binancecoin", "cardano", "solana"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cycle_interval_secs: 300,
            subject_delay_secs: 2,
            failure_burst: 3,
            failure_backoff_secs: 30,
            cleanup_interval_secs: 3600,
            cooldown_max_age_hours: 24,
            history_retention_days: 30,
            autostart: true,
        }
    }
}

/// Decision core settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Dispatches admitted per trailing 60 s window
    pub max_per_minute: usize,
    pub cooldown: CooldownConfig,
    pub filter: FilterConfig,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_per_minute: 5,
            cooldown: CooldownConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

/// # Summary
/// Suppression window per priority.
///
/// # Invariants
/// - `high_secs <= medium_secs <= low_secs`: urgent conditions may repeat sooner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub high_secs: u32,
    pub medium_secs: u32,
    pub low_secs: u32,
}

impl CooldownConfig {
    pub fn duration_for(&self, priority: Priority) -> Duration {
        let secs = match priority {
            Priority::High => self.high_secs,
            Priority::Medium => self.medium_secs,
            Priority::Low => self.low_secs,
        };
        Duration::seconds(i64::from(secs))
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            high_secs: 1800,
            medium_secs: 3600,
            low_secs: 7200,
        }
    }
}

/// Minimum market quality for any alert, whatever its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_volume_24h: f64,
    pub min_market_cap: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_volume_24h: 1_000_000.0,
            min_market_cap: 10_000_000.0,
        }
    }
}

/// Market data provider (CoinGecko-compatible REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    /// Pro API key; empty uses the public tier
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Whale Alert API; tracking is off while `api_key` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhaleConfig {
    pub base_url: String,
    pub api_key: String,
    pub min_value_usd: u64,
    pub limit: u32,
}

impl Default for WhaleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.whale-alert.io/v1".to_string(),
            api_key: String::new(),
            min_value_usd: 1_000_000,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.from.is_empty() && !self.to.is_empty()
    }
}

impl AppConfig {
    /// # Summary
    /// Rejects settings the decision core cannot honor.
    ///
    /// # Logic
    /// 1. The rate limit must admit at least one dispatch.
    /// 2. Cooldowns must be positive and ordered high <= medium <= low.
    /// 3. Filter thresholds must be finite and non-negative.
    /// 4. At least one subject must be tracked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alert.max_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "alert.max_per_minute",
                reason: "must be at least 1".to_string(),
            });
        }

        let cd = &self.alert.cooldown;
        if cd.high_secs == 0 || !(cd.high_secs <= cd.medium_secs && cd.medium_secs <= cd.low_secs) {
            return Err(ConfigError::Invalid {
                field: "alert.cooldown",
                reason: format!(
                    "expected 0 < high <= medium <= low, got {}/{}/{}",
                    cd.high_secs, cd.medium_secs, cd.low_secs
                ),
            });
        }

        for (field, value) in [
            ("alert.filter.min_volume_24h", self.alert.filter.min_volume_24h),
            ("alert.filter.min_market_cap", self.alert.filter.min_market_cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        if self.scanner.subjects.is_empty() {
            return Err(ConfigError::Invalid {
                field: "scanner.subjects",
                reason: "at least one subject is required".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.data_dir, "data");
        assert_eq!(config.alert.max_per_minute, 5);
        assert_eq!(config.alert.filter.min_volume_24h, 1_000_000.0);
        assert_eq!(config.alert.filter.min_market_cap, 10_000_000.0);
        assert_eq!(config.scanner.cycle_interval_secs, 300);
        assert_eq!(config.scanner.failure_backoff_secs, 30);
        assert_eq!(config.scanner.subjects.len(), 5);
        assert!(!config.telegram.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cooldown_durations_follow_priority() {
        let cd = CooldownConfig::default();
        assert_eq!(cd.duration_for(Priority::High), Duration::seconds(1800));
        assert_eq!(cd.duration_for(Priority::Medium), Duration::seconds(3600));
        assert_eq!(cd.duration_for(Priority::Low), Duration::seconds(7200));
    }

    #[test]
    fn test_validate_rejects_zero_rate_limit() {
        let mut config = AppConfig::default();
        config.alert.max_per_minute = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "alert.max_per_minute", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_cooldowns() {
        let mut config = AppConfig::default();
        config.alert.cooldown.high_secs = 9000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"alert": {"max_per_minute": 2}}"#).unwrap();
        assert_eq!(config.alert.max_per_minute, 2);
        assert_eq!(config.alert.cooldown.medium_secs, 3600);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
