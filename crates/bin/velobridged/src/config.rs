//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `velobridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use velobridge_adapter_mqtt::{MqttConfig, parse_broker_url};
use velobridge_adapter_storage_sqlite_sqlx::Config as StorageConfig;
use velobridge_app::dispatcher::Topics;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and topic settings.
    pub mqtt: MqttConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Create the telemetry tables on startup if missing.
    pub create_schema: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
    /// File the log is appended to.
    pub file: String,
}

impl Config {
    /// Load configuration from `velobridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or unreadable,
    /// or if the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("velobridge.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        config.fill_handler_limit();
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MQTT_BROKER") {
            self.mqtt.broker_url = val;
        }
        if let Some(val) = var("VELOBRIDGE_CLIENT_ID") {
            self.mqtt.client_id = val;
        }
        if let Some(val) = var("DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("VELOBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("VELOBRIDGE_LOG_FILE") {
            self.logging.file = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mqtt = &self.mqtt;
        if mqtt.battery_topic.is_empty() || mqtt.location_topic.is_empty() {
            return Err(ConfigError::Validation("topics must be non-empty".to_string()));
        }
        if mqtt.battery_topic == mqtt.location_topic {
            return Err(ConfigError::Validation(
                "battery and location topics must differ".to_string(),
            ));
        }
        if let Err(err) = mqtt.subscription_qos() {
            return Err(ConfigError::Validation(err.to_string()));
        }
        if let Err(err) = parse_broker_url(&mqtt.broker_url) {
            return Err(ConfigError::Validation(err.to_string()));
        }
        if mqtt.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel capacity must be non-zero".to_string(),
            ));
        }
        if mqtt.max_in_flight == Some(0) {
            return Err(ConfigError::Validation(
                "max_in_flight must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "max_connections must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Default the concurrent handler limit to the pool size.
    fn fill_handler_limit(&mut self) {
        if self.mqtt.max_in_flight.is_none() {
            self.mqtt.max_in_flight = usize::try_from(self.database.max_connections).ok();
        }
    }

    /// Return the storage adapter configuration.
    #[must_use]
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            create_schema: self.database.create_schema,
        }
    }

    /// Return the topics the dispatcher subscribes to.
    #[must_use]
    pub fn topics(&self) -> Topics {
        Topics {
            battery: self.mqtt.battery_topic.clone(),
            location: self.mqtt.location_topic.clone(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:velobridge.db?mode=rwc".to_string(),
            max_connections: 5,
            create_schema: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "velobridged=info,velobridge=info".to_string(),
            file: "velobridge.log".to_string(),
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
