//! HTTP Basic authentication shared by STOW-RS and WADO-RS

use base64::{engine::general_purpose, Engine as _};
use http::HeaderValue;

use crate::config::Endpoint;
use crate::error::{DicomWebError, Result};

/// Encode `username:password` as an `Authorization: Basic ...` header value
pub fn basic_auth_header(endpoint: &Endpoint) -> Result<HeaderValue> {
    let credentials = format!("{}:{}", endpoint.username, endpoint.password);
    let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
        .map_err(|e| DicomWebError::internal(format!("invalid Authorization header: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}
