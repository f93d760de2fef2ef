use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings shared by every service, read from `configuration.*` and the
/// process environment (`PORT`, `ENVIRONMENT`, `NODE_ENV`, `LOG_LEVEL`,
/// `OTLP_ENDPOINT`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    environment: Option<Environment>,
    #[serde(default)]
    node_env: Option<Environment>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Deployment environment. Only production changes runtime behaviour;
/// names outside the known set are kept verbatim.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "String")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
    Other(String),
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "production" | "prod" => Environment::Production,
            _ => Environment::Other(value),
        }
    }
}

impl Environment {
    /// Production runs behind a serverless host that owns the socket.
    pub fn is_serverless(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            environment: None,
            node_env: None,
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// `ENVIRONMENT` wins over `NODE_ENV` when both are set.
    pub fn environment(&self) -> Environment {
        self.environment
            .clone()
            .or_else(|| self.node_env.clone())
            .unwrap_or_default()
    }
}
