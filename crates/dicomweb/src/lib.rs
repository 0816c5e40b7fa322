//! DICOMweb client for moving imaging objects to and from a PACS
//!
//! This crate implements the two DICOMweb transactions a data pipeline needs:
//! STOW-RS (upload one or more objects as a `multipart/related` POST) and
//! WADO-RS (download a `multipart/related` bundle of objects).
//!
//! # Features
//! - `multipart/related` encoder and a standalone MIME multipart decoder
//! - HTTP Basic authentication
//! - Pluggable [`HttpTransport`], with a `reqwest` implementation behind the
//!   default `reqwest-transport` feature
//!
//! Objects are opaque byte buffers; nothing here looks inside a DICOM file.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod multipart;
pub mod transport;

// Re-export commonly used types
pub use client::{DicomWebClient, StowBody};
pub use config::{Endpoint, TransportConfig};
pub use error::{DicomWebError, Result};
pub use multipart::{BodySegment, MultipartMessage, MultipartRelated};
pub use transport::HttpTransport;

#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;

/// Media type of a single DICOM object
pub const APPLICATION_DICOM: &str = "application/dicom";
