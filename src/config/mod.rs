//! Configuration management for the booking service
//!
//! Configuration comes from defaults, environment variables (`BOOKING_*`),
//! a TOML file, or the builder; every path ends in [`Config::validate`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const MAX_TIMEOUT_MS: u64 = 60_000;
const MAX_COURSE_DAYS: u32 = 3_660;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Request timeout used when the client does not pass one
    pub default_timeout_ms: u64,

    /// Upper bound for client-supplied timeouts
    pub max_timeout_ms: u64,

    /// Longest course accepted, in days (one class is allocated per day)
    pub max_course_days: u32,

    /// Enable CORS for API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_timeout_ms: MAX_TIMEOUT_MS,
            max_course_days: MAX_COURSE_DAYS,
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Default request timeout as Duration
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Maximum request timeout as Duration
    #[must_use]
    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from environment variables, defaulting the rest
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = env_var("BOOKING_BIND_ADDRESS") {
            config.server.bind_address = parse_field("bind_address", &addr)?;
        }
        if let Some(ms) = env_var("BOOKING_DEFAULT_TIMEOUT_MS") {
            config.server.default_timeout_ms = parse_field("default_timeout_ms", &ms)?;
        }
        if let Some(ms) = env_var("BOOKING_MAX_TIMEOUT_MS") {
            config.server.max_timeout_ms = parse_field("max_timeout_ms", &ms)?;
        }
        if let Some(days) = env_var("BOOKING_MAX_COURSE_DAYS") {
            config.server.max_course_days = parse_field("max_course_days", &days)?;
        }
        if let Some(flag) = env_var("BOOKING_ENABLE_CORS") {
            config.server.enable_cors = parse_field("enable_cors", &flag)?;
        }
        if let Some(flag) = env_var("BOOKING_REQUEST_LOGGING") {
            config.server.enable_request_logging = parse_field("enable_request_logging", &flag)?;
        }
        if let Some(level) = env_var("BOOKING_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = env_var("BOOKING_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.default_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "default_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if self.server.max_timeout_ms < self.server.default_timeout_ms {
            return Err(ConfigError::invalid(
                "max_timeout_ms",
                "Must not be smaller than default_timeout_ms",
            ));
        }

        if self.server.max_course_days == 0 {
            return Err(ConfigError::invalid(
                "max_course_days",
                "Must be greater than 0",
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::invalid(
                "logging.format",
                format!("Unknown format '{}', expected text or json", self.logging.format),
            ));
        }

        if self.logging.level.is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("Cannot parse '{value}'"),
    })
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    bind_address: Option<SocketAddr>,
    default_timeout_ms: Option<u64>,
    max_timeout_ms: Option<u64>,
    max_course_days: Option<u32>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    log_level: Option<String>,
    log_format: Option<String>,
}

impl ConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(parse_field("bind_address", addr)?);
        Ok(self)
    }

    /// Set default request timeout
    pub fn default_timeout_ms(mut self, ms: u64) -> Self {
        self.default_timeout_ms = Some(ms);
        self
    }

    /// Set maximum request timeout
    pub fn max_timeout_ms(mut self, ms: u64) -> Self {
        self.max_timeout_ms = Some(ms);
        self
    }

    /// Set the longest accepted course
    pub fn max_course_days(mut self, days: u32) -> Self {
        self.max_course_days = Some(days);
        self
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Set log format
    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.log_format = Some(format.into());
        self
    }

    /// Build the config
    pub fn build(self) -> Result<Config, ConfigError> {
        let server = ServerConfig::default();
        let logging = LoggingConfig::default();

        let config = Config {
            server: ServerConfig {
                bind_address: self.bind_address.unwrap_or(server.bind_address),
                default_timeout_ms: self.default_timeout_ms.unwrap_or(server.default_timeout_ms),
                max_timeout_ms: self.max_timeout_ms.unwrap_or(server.max_timeout_ms),
                max_course_days: self.max_course_days.unwrap_or(server.max_course_days),
                enable_cors: self.enable_cors.unwrap_or(server.enable_cors),
                enable_request_logging: self
                    .enable_request_logging
                    .unwrap_or(server.enable_request_logging),
            },
            logging: LoggingConfig {
                level: self.log_level.unwrap_or(logging.level),
                format: self.log_format.unwrap_or(logging.format),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
