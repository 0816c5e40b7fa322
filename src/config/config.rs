use dicomweb::TransportConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::config::logging_config::LoggingConfig;
use crate::config::transfer_config::TransferConfig;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid transfer configuration: {0}")]
    InvalidTransfer(String),

    #[error("Invalid http configuration: {0}")]
    InvalidHttp(String),
}

/// Top-level data plane configuration
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub http: TransportConfig,
}

impl Config {
    /// Load and validate a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.transfer.validate()?;
        self.http
            .validate()
            .map_err(|e| ConfigError::InvalidHttp(e.to_string()))?;
        Ok(())
    }
}
