//! Configuration file parsing
//!
//! Parses TOML configuration files for the file server.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding the stored files
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Drop connections that stay silent this long
    #[serde(default)]
    pub read_timeout_secs: Option<u64>,

    /// fsync every stored file before acknowledging it
    #[serde(default)]
    pub sync_writes: bool,
}

fn default_bind() -> String {
    format!("0.0.0.0:{}", crate::protocol::DEFAULT_PORT)
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            storage_root: default_storage_root(),
            log_level: default_log_level(),
            read_timeout_secs: None,
            sync_writes: false,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".to_string()));
        }

        if server.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_root is empty".to_string()));
        }

        if parse_log_level(&server.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                server.log_level
            )));
        }

        if server.read_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "read_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse log level string
pub fn parse_log_level(level: &str) -> Option<log::LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Some(log::LevelFilter::Trace),
        "debug" => Some(log::LevelFilter::Debug),
        "info" => Some(log::LevelFilter::Info),
        "warn" | "warning" => Some(log::LevelFilter::Warn),
        "error" => Some(log::LevelFilter::Error),
        "off" => Some(log::LevelFilter::Off),
        _ => None,
    }
}
