use serde::Deserialize;

use crate::config::config::ConfigError;

/// Sizing of the parallel sink
#[derive(Debug, Deserialize, Clone)]
pub struct TransferConfig {
    /// Maximum number of batches stored concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of parts sent per STOW-RS request
    #[serde(default = "default_partition_size")]
    pub partition_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            partition_size: default_partition_size(),
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidTransfer(
                "workers must be greater than 0".to_string(),
            ));
        }
        if self.partition_size == 0 {
            return Err(ConfigError::InvalidTransfer(
                "partition_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_workers() -> usize {
    4
}

fn default_partition_size() -> usize {
    5
}
