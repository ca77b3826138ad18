use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::DataSourceStrategy;

/// Prefix of every environment variable read by the service
pub const ENV_PREFIX: &str = "SPEEDLIV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub datasource: DataSourceConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

/// Client side: where the menu service lives and how the cart fans out
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,
    #[serde(default = "default_catalog_timeout")]
    pub catalog_timeout_seconds: u64,
    #[serde(default = "default_cart_channel_capacity")]
    pub cart_channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    #[serde(default)]
    pub datasource_strategy: DataSourceStrategy,
    #[serde(default = "default_restaurants_json_path")]
    pub restaurants_json_path: PathBuf,
    #[serde(default = "default_seed_json_path")]
    pub seed_json_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let config = Config {
            server: ServerConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
            datasource: DataSourceConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };

        config.validate()?;

        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Request timeout cannot be 0".to_string(),
            });
        }

        if self.catalog.catalog_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Catalog base URL cannot be empty".to_string(),
            });
        }

        if self.catalog.catalog_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Catalog timeout cannot be 0".to_string(),
            });
        }

        if self.catalog.cart_channel_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "Cart channel capacity cannot be 0".to_string(),
            });
        }

        Ok(())
    }
}

fn load_section<T: DeserializeOwned>(section: &str) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("server")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("catalog")
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_seconds)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: default_catalog_base_url(),
            catalog_timeout_seconds: default_catalog_timeout(),
            cart_channel_capacity: default_cart_channel_capacity(),
        }
    }
}

impl DataSourceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("datasource")
    }
}

impl ObservabilityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("observability")
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: default_service_version(),
            otlp_endpoint: None,
            log_level: default_log_level(),
            enable_json_logging: false,
        }
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8088
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_catalog_base_url() -> String {
    "http://localhost:8088".to_string()
}

pub(crate) fn default_catalog_timeout() -> u64 {
    10
}

pub(crate) fn default_cart_channel_capacity() -> usize {
    crate::services::cart_store::DEFAULT_CHANNEL_CAPACITY
}

pub(crate) fn default_restaurants_json_path() -> PathBuf {
    PathBuf::from("data/restaurants.json")
}

pub(crate) fn default_seed_json_path() -> PathBuf {
    PathBuf::from("data/restaurants-seed.json")
}

pub(crate) fn default_service_name() -> String {
    "speedliv-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
