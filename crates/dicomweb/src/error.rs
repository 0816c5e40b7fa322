//! Error types for DICOMweb operations

use thiserror::Error;

/// Result type alias for DICOMweb operations
pub type Result<T> = std::result::Result<T, DicomWebError>;

/// Error types that can occur while talking to a DICOMweb archive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DicomWebError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP exchange itself failed (connect, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The archive answered with a non-2xx status
    #[error("{operation} failed with status {status}: {reason}")]
    Status {
        operation: &'static str,
        status: u16,
        reason: String,
    },

    /// The response body is not a valid multipart document
    #[error("Failed to parse MIME message: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DicomWebError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code carried by a [`DicomWebError::Status`] error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DicomWebError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a transient transport condition
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DicomWebError::Transport(_))
    }
}
