//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `roomsense.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use roomsense_app::poller::PollerConfig;
use roomsense_app::services::history_service::HistoryPolicy;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// History sampling and retention.
    pub history: HistoryConfig,
    /// Reading poller.
    pub poller: PollerSettings,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// History retention configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Minimum number of seconds between two saved records.
    pub retention_interval_secs: u64,
    /// Records kept before the oldest are evicted.
    pub max_records: usize,
}

/// Poller configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub enabled: bool,
    /// Base URL of a remote sensor device. When unset the poller reads the
    /// values pushed to this server's own `POST /api/data`.
    pub source_url: Option<String>,
    pub interval_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// Flag readings in the simulation band when the source does not say.
    pub detect_simulated: bool,
}

impl Config {
    /// Load configuration from `roomsense.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("roomsense.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides looked up by variable name through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ROOMSENSE_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("ROOMSENSE_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        let bind = var("ROOMSENSE_BIND");
        if let Some((host, port)) = bind.as_deref().and_then(|val| val.rsplit_once(':')) {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("ROOMSENSE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("ROOMSENSE_SOURCE_URL") {
            self.poller.source_url = Some(val).filter(|url| !url.is_empty());
        }
        if let Some(val) = var("ROOMSENSE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.history.max_records == 0 {
            return Err(ConfigError::Validation(
                "history.max_records must be non-zero".to_string(),
            ));
        }
        if self.poller.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poller.interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn history_policy(&self) -> HistoryPolicy {
        HistoryPolicy {
            min_interval: Duration::from_secs(self.history.retention_interval_secs),
            max_records: self.history.max_records,
        }
    }

    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.poller.interval_secs),
            max_retries: self.poller.max_retries,
            retry_delay: Duration::from_secs(self.poller.retry_delay_secs),
            detect_simulated: self.poller.detect_simulated,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:roomsense.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "roomsensed=info,roomsense=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let policy = HistoryPolicy::default();
        Self {
            retention_interval_secs: policy.min_interval.as_secs(),
            max_records: policy.max_records,
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        let defaults = PollerConfig::default();
        Self {
            enabled: true,
            source_url: None,
            interval_secs: defaults.interval.as_secs(),
            max_retries: defaults.max_retries,
            retry_delay_secs: defaults.retry_delay.as_secs(),
            detect_simulated: defaults.detect_simulated,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:roomsense.db?mode=rwc");
        assert_eq!(config.history.retention_interval_secs, 600);
        assert_eq!(config.history.max_records, 1000);
        assert!(config.poller.enabled);
        assert!(config.poller.source_url.is_none());
        assert_eq!(config.poller.interval_secs, 5);
        assert_eq!(config.poller.max_retries, 3);
        assert_eq!(config.poller.retry_delay_secs, 2);
        assert!(config.poller.detect_simulated);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [history]
            retention_interval_secs = 1800
            max_records = 50

            [poller]
            enabled = false
            source_url = 'http://192.168.1.50'
            interval_secs = 10
            max_retries = 5
            retry_delay_secs = 1
            detect_simulated = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.history.retention_interval_secs, 1800);
        assert_eq!(config.history.max_records, 50);
        assert!(!config.poller.enabled);
        assert_eq!(
            config.poller.source_url.as_deref(),
            Some("http://192.168.1.50")
        );
        assert_eq!(config.poller.interval_secs, 10);
        assert_eq!(config.poller.max_retries, 5);
        assert_eq!(config.poller.retry_delay_secs, 1);
        assert!(!config.poller.detect_simulated);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_max_records() {
        let mut config = Config::default();
        config.history.max_records = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("max_records")
        ));
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.poller.interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("interval_secs")
        ));
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let mut config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_override_from_environment() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("ROOMSENSE_HOST", "127.0.0.1"),
            ("ROOMSENSE_PORT", "8081"),
            ("ROOMSENSE_DATABASE_URL", "sqlite::memory:"),
            ("ROOMSENSE_SOURCE_URL", "http://sensor.local"),
            ("ROOMSENSE_LOG", "debug"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(
            config.poller.source_url.as_deref(),
            Some("http://sensor.local")
        );
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_split_bind_override_into_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ROOMSENSE_BIND", "192.168.0.2:4000")]));
        assert_eq!(config.server.host, "192.168.0.2");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn should_prefer_rust_log_over_roomsense_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ROOMSENSE_LOG", "debug"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ROOMSENSE_PORT", "eighty")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_clear_source_url_with_empty_override() {
        let mut config = Config::default();
        config.poller.source_url = Some("http://sensor.local".to_string());
        config.apply_overrides(env(&[("ROOMSENSE_SOURCE_URL", "")]));
        assert!(config.poller.source_url.is_none());
    }

    #[test]
    fn should_convert_to_app_policies() {
        let config = Config::default();
        assert_eq!(config.history_policy(), HistoryPolicy::default());
        assert_eq!(config.poller_config(), PollerConfig::default());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
