//! Configuration types for DICOMweb endpoints and the HTTP transport

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{DicomWebError, Result};

/// Address and Basic-Auth credentials of a DICOMweb archive
///
/// Immutable for the lifetime of a transfer and shared by every worker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Full STOW-RS or WADO-RS resource URL
    pub url: String,

    pub username: String,

    pub password: String,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validate the endpoint before any transfer is attempted
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(DicomWebError::config("url must not be empty"));
        }
        if self.username.is_empty() {
            return Err(DicomWebError::config("username must not be empty"));
        }
        if self.password.is_empty() {
            return Err(DicomWebError::config("password must not be empty"));
        }

        url::Url::parse(&self.url)
            .map_err(|e| DicomWebError::config(format!("invalid url '{}': {}", self.url, e)))?;
        // Requests are built with `http::Uri`, which is stricter than `url::Url`
        http::Uri::try_from(self.url.as_str())
            .map_err(|e| DicomWebError::config(format!("invalid url '{}': {}", self.url, e)))?;

        Ok(())
    }
}

// Keep the password out of logs.
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings for the default HTTP transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl TransportConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(DicomWebError::config("timeout_ms must be greater than 0"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(DicomWebError::config(
                "connect_timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    300_000 // 5 minutes, studies can be large
}

fn default_connect_timeout() -> u64 {
    30_000
}
