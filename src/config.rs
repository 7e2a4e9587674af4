//! Configuration management for the Open-Meteo tools
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates every setting before a client is built.

use crate::error::MeteoError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix; nested keys use `__`, e.g. `OPEN_METEO__UPSTREAM__TIMEOUT_SECONDS`
pub const ENV_PREFIX: &str = "OPEN_METEO";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeteoConfig {
    /// Upstream HTTP settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Lower bound of the exponential backoff interval
    #[serde(default = "default_min_retry_interval")]
    pub min_retry_interval_ms: u64,
    /// Upper bound of the exponential backoff interval
    #[serde(default = "default_max_retry_interval")]
    pub max_retry_interval_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Single origin replacing all five upstream hosts (proxies, stub servers)
    #[serde(default)]
    pub base_url_override: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_min_retry_interval() -> u64 {
    500
}

fn default_max_retry_interval() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("open-meteo-tools/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            min_retry_interval_ms: default_min_retry_interval(),
            max_retry_interval_ms: default_max_retry_interval(),
            user_agent: default_user_agent(),
            base_url_override: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MeteoConfig {
    /// Load configuration from environment variables only
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from an optional TOML file, then environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(config_file) = config_path {
            if config_file.exists() {
                builder = builder.add_source(
                    File::from(config_file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: MeteoConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_timeout();
        }
        if self.upstream.user_agent.trim().is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self
            .upstream
            .base_url_override
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.upstream.base_url_override = None;
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds > 300 {
            return Err(MeteoError::config("Upstream timeout cannot exceed 300 seconds").into());
        }

        if self.upstream.max_retries > 10 {
            return Err(MeteoError::config("Upstream max retries cannot exceed 10").into());
        }

        if self.upstream.min_retry_interval_ms > self.upstream.max_retry_interval_ms {
            return Err(MeteoError::config(format!(
                "Minimum retry interval ({}ms) cannot exceed the maximum ({}ms)",
                self.upstream.min_retry_interval_ms, self.upstream.max_retry_interval_ms
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(MeteoError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(MeteoError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if let Some(url) = &self.upstream.base_url_override {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(MeteoError::config(
                    "Upstream base URL override must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}
