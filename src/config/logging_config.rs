use serde::Deserialize;

use crate::config::config::ConfigError;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default = "default_log_file_path")]
    pub log_file_path: String,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `dicomweb=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_to_file: false,
            log_file_path: default_log_file_path(),
            log_level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_to_file && self.log_file_path.trim().is_empty() {
            return Err(ConfigError::InvalidLogging(
                "log_file_path is required when log_to_file is enabled".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidLogging(
                "log_level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_file_path() -> String {
    "./tmp/dicomweb-plane.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
