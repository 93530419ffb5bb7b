//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tdex_core::{Network, Provider};
use tdex_registry::{DEFAULT_LIQUID_REGISTRY_URL, DEFAULT_TESTNET_REGISTRY_URL};
use tdex_telemetry::LogConfig;

/// Config file used when neither `--config` nor `TDEX_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Provider registry locations, one per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_liquid_url")]
    pub liquid_url: String,
    #[serde(default = "default_testnet_url")]
    pub testnet_url: String,
}

fn default_liquid_url() -> String {
    DEFAULT_LIQUID_REGISTRY_URL.to_string()
}

fn default_testnet_url() -> String {
    DEFAULT_TESTNET_REGISTRY_URL.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            liquid_url: default_liquid_url(),
            testnet_url: default_testnet_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (seconds). Default: 15.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Endpoint every trade is pinned to. Unset means all registry providers.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from `TDEX_CONFIG` (or the default path) and
    /// `TDEX__*` environment overrides.
    pub fn load() -> AppResult<Self> {
        let path =
            std::env::var("TDEX_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Layered load: optional file at `path`, then environment.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            tracing::warn!(path = %path, "Config file not found, using defaults");
        }

        config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix("TDEX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| AppError::Config(format!("Failed to load config: {e}")))
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// The pinned provider, if any.
    pub fn pinned_provider(&self) -> Option<Provider> {
        self.trade
            .provider
            .as_deref()
            .and_then(Provider::from_endpoint)
    }
}
