use dicomweb::DicomWebError;
use thiserror::Error;

/// Failure of a source, sink or pipeline operation
#[derive(Debug, Error)]
pub enum TransferError {
    /// Bad addresses, missing properties or incomplete construction
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    /// The archive answered with a non-success status
    #[error("{0}")]
    Protocol(String),

    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Error reading part '{name}': {reason}")]
    PartRead { name: String, reason: String },

    #[error("{} of {total} batches failed: {}", .failures.len(), join_failures(.failures))]
    BatchesFailed {
        total: usize,
        failures: Vec<TransferError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_failures(failures: &[TransferError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TransferError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn part_read(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::PartRead {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify a client error, prefixing its detail with `context`
    pub fn from_client(context: &str, error: DicomWebError) -> Self {
        let detail = format!("{}{}", context, error);
        match error {
            DicomWebError::Config(_) => Self::Validation(detail),
            DicomWebError::Transport(_) => Self::Transport(detail),
            DicomWebError::Status { .. } => Self::Protocol(detail),
            DicomWebError::Decode(_) => Self::Decode(detail),
            DicomWebError::Internal(_) => Self::Internal(detail),
        }
    }

    /// Only internal faults are fatal; everything else is an expected runtime outcome
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<DicomWebError> for TransferError {
    fn from(error: DicomWebError) -> Self {
        Self::from_client("", error)
    }
}
