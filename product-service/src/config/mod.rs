use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    /// Used only when the URI does not name a database.
    pub database: String,
    pub server_selection_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: "test".to_string(),
            server_selection_timeout_ms: 5_000,
            connect_timeout_ms: 10_000,
        }
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl ProductConfig {
    pub fn load() -> Result<Self, AppError> {
        // Loads .env and the shared PORT / ENVIRONMENT settings.
        let common = core_config::Config::load()?;

        Ok(ProductConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGO_URI", None)?,
                database: get_env("MONGO_DATABASE", Some("test"))?,
                server_selection_timeout_ms: parse_millis(
                    "MONGO_SERVER_SELECTION_TIMEOUT_MS",
                    &get_env("MONGO_SERVER_SELECTION_TIMEOUT_MS", Some("5000"))?,
                )?,
                connect_timeout_ms: parse_millis(
                    "MONGO_CONNECT_TIMEOUT_MS",
                    &get_env("MONGO_CONNECT_TIMEOUT_MS", Some("10000"))?,
                )?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, AppError> {
    value.trim().parse::<u64>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "{} must be a whole number of milliseconds, got '{}': {}",
            key,
            value,
            e
        ))
    })
}
