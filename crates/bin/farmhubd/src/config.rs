//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `farmhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use farmhub_adapter_cache_redis::RedisConfig;
use farmhub_adapter_mqtt::MqttConfig;
use farmhub_app::scheduler::SchedulerOptions;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MQTT broker settings, shared by listener and publisher.
    pub broker: MqttConfig,
    /// Redis latest-value cache settings.
    pub cache: RedisConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Rule evaluation loop settings.
    pub evaluation: EvaluationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Rule evaluation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Seconds between evaluation passes. Zero falls back to the
    /// default interval.
    pub interval_secs: u64,
    /// Seconds to back off after a failed pass.
    pub recovery_sleep_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `farmhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("farmhub.toml")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FARMHUB_BROKER_HOST") {
            self.broker.broker_host = val;
        }
        if let Ok(val) = std::env::var("FARMHUB_BROKER_PORT") {
            if let Ok(port) = val.parse() {
                self.broker.broker_port = port;
            }
        }
        if let Ok(val) = std::env::var("FARMHUB_CACHE_URL") {
            self.cache.url = val;
        }
        if let Ok(val) = std::env::var("FARMHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("FARMHUB_EVAL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.evaluation.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("FARMHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }
}

impl EvaluationConfig {
    /// Scheduler timing derived from this configuration. A zero
    /// interval is replaced by the default rather than spinning.
    #[must_use]
    pub fn scheduler_options(&self) -> SchedulerOptions {
        let defaults = SchedulerOptions::default();
        SchedulerOptions {
            interval: if self.interval_secs == 0 {
                defaults.interval
            } else {
                Duration::from_secs(self.interval_secs)
            },
            recovery_sleep: if self.recovery_sleep_secs == 0 {
                defaults.recovery_sleep
            } else {
                Duration::from_secs(self.recovery_sleep_secs)
            },
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:farmhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            recovery_sleep_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "farmhubd=info,farmhub=info".to_string(),
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
}
