//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::calculate::DEFAULT_HEAD_TO_HEAD_LIMIT;
use crate::fetch::{FetcherConfig, DEFAULT_BASE_URL};
use crate::pipeline::{PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_MEMBERS};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root; endpoint paths are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("league-stats/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Fetch and aggregation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_max_members")]
    pub max_members: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_head_to_head_limit")]
    pub head_to_head_limit: usize,
}

fn default_max_members() -> usize {
    DEFAULT_MAX_MEMBERS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_head_to_head_limit() -> usize {
    DEFAULT_HEAD_TO_HEAD_LIMIT
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_members: default_max_members(),
            batch_size: default_batch_size(),
            head_to_head_limit: default_head_to_head_limit(),
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime, e.g. "90s", "5m", "1h"
    #[serde(default = "default_ttl")]
    pub ttl: String,

    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl() -> String {
    format!("{}m", DEFAULT_TTL.as_secs() / 60)
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            capacity: default_capacity(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub pipeline: PipelineSettings,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            pipeline: PipelineSettings::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.api.base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "API base URL is not an absolute URL: {}",
                    self.api.base_url
                )))
            }
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_members == 0 {
            return Err(ConfigError::ValidationError(
                "Max members must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        self.cache_ttl()?;

        if self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "Cache capacity must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed cache TTL. Zero is rejected.
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        match crate::parse_duration(&self.cache.ttl) {
            Some(ttl) if !ttl.is_zero() => Ok(ttl),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid cache TTL: {:?}",
                self.cache.ttl
            ))),
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_seconds),
            user_agent: self.api.user_agent.clone(),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_members: self.pipeline.max_members,
            batch_size: self.pipeline.batch_size,
            head_to_head_limit: self.pipeline.head_to_head_limit,
        }
    }
}
