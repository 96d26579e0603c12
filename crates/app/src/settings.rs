//! # Configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, the optional TOML file,
//! then `KOBAN__SECTION__KEY` environment variables.

use config::{Config, Environment, File, FileFormat};
use koban_core::config::{AppConfig, ConfigError};

pub const DEFAULT_CONFIG_FILE: &str = "config/koban.toml";
const ENV_PREFIX: &str = "KOBAN";

/// # Summary
/// Loads and validates the application configuration.
///
/// # Logic
/// 1. Read `path` if it exists (missing file is fine).
/// 2. Overlay environment variables; `KOBAN__SCANNER__SUBJECTS` takes a comma list.
/// 3. Deserialize over `AppConfig::default()` and validate.
pub fn load(path: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scanner.subjects")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.alert.max_per_minute, 5);
        assert_eq!(config.scanner.subjects.len(), 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("koban.toml");
        fs::write(
            &path,
            r#"
            [scanner]
            subjects = ["bitcoin"]
            subject_delay_secs = 5

            [alert]
            max_per_minute = 3

            [alert.cooldown]
            high_secs = 600
            "#,
        )
        .unwrap();

        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.scanner.subjects, vec!["bitcoin".to_string()]);
        assert_eq!(config.scanner.subject_delay_secs, 5);
        assert_eq!(config.scanner.cycle_interval_secs, 300);
        assert_eq!(config.alert.max_per_minute, 3);
        assert_eq!(config.alert.cooldown.high_secs, 600);
        assert_eq!(config.alert.cooldown.medium_secs, 3600);
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("koban.toml");
        fs::write(&path, "[alert]\nmax_per_minute = 0\n").unwrap();
        assert!(matches!(
            load(path.to_str().unwrap()),
            Err(ConfigError::Invalid { field: "alert.max_per_minute", .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("koban.toml");
        fs::write(&path, "[alert\nmax_per_minute = ").unwrap();
        assert!(matches!(
            load(path.to_str().unwrap()),
            Err(ConfigError::Load(_))
        ));
    }
}
