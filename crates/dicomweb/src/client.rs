//! STOW-RS and WADO-RS client

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response};
use tracing::{debug, warn};

use crate::auth::basic_auth_header;
use crate::config::Endpoint;
use crate::error::{DicomWebError, Result};
use crate::multipart::{self, MultipartRelated};
use crate::transport::HttpTransport;
use crate::APPLICATION_DICOM;

/// Stateless DICOMweb client, cheap to clone and safe to share between workers
#[derive(Clone)]
pub struct DicomWebClient {
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for DicomWebClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DicomWebClient").finish_non_exhaustive()
    }
}

/// A STOW-RS request body ready to be sent
#[derive(Debug)]
pub struct StowBody {
    pub boundary: String,
    pub body: Bytes,
}

impl StowBody {
    /// Encode objects as `multipart/related` segments named `dicomfile-<n>.dcm`
    pub fn encode(objects: &[Bytes]) -> Self {
        let mut builder = MultipartRelated::new(APPLICATION_DICOM);
        for (index, object) in objects.iter().enumerate() {
            let disposition = format!(
                "form-data; name=\"file\"; filename=\"dicomfile-{}.dcm\"",
                index + 1
            );
            builder.add_segment(&[("Content-Disposition", disposition)], APPLICATION_DICOM, object);
        }
        let boundary = builder.boundary().to_string();
        Self {
            boundary,
            body: builder.finish(),
        }
    }

    /// Value of the request `Content-Type` header
    pub fn content_type(&self) -> String {
        format!(
            "multipart/related; type={}; boundary={}",
            APPLICATION_DICOM, self.boundary
        )
    }
}

impl DicomWebClient {
    /// Create a new client on top of the given transport
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Store objects with one STOW-RS POST and return the archive's response text
    pub async fn store(&self, endpoint: &Endpoint, objects: Vec<Bytes>) -> Result<String> {
        let stow = StowBody::encode(&objects);
        let content_type = HeaderValue::from_str(&stow.content_type())
            .map_err(|e| DicomWebError::internal(format!("invalid Content-Type: {}", e)))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(endpoint.url.as_str())
            .header(AUTHORIZATION, basic_auth_header(endpoint)?)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, "application/json")
            .body(stow.body)
            .map_err(|e| DicomWebError::config(format!("invalid STOW-RS request: {}", e)))?;

        debug!(
            "STOW-RS: sending {} object(s) to {}",
            objects.len(),
            endpoint.url
        );
        let response = self.transport.execute(request).await?;
        let response = Self::check_status("STOW-RS", endpoint, response)?;

        Ok(String::from_utf8_lossy(response.body()).into_owned())
    }

    /// Retrieve all objects of a WADO-RS resource, in response order
    pub async fn retrieve(&self, endpoint: &Endpoint) -> Result<Vec<Bytes>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(endpoint.url.as_str())
            .header(AUTHORIZATION, basic_auth_header(endpoint)?)
            .body(Bytes::new())
            .map_err(|e| DicomWebError::config(format!("invalid WADO-RS request: {}", e)))?;

        let response = self.transport.execute(request).await?;
        let response = Self::check_status("WADO-RS", endpoint, response)?;

        let message = multipart::frame_and_parse(response.headers(), response.body())?;
        debug!(
            "WADO-RS: decoded {} segment(s) from {}",
            message.segments.len(),
            endpoint.url
        );
        Ok(message.into_payloads())
    }

    /// Map a non-2xx response to [`DicomWebError::Status`].
    ///
    /// `http::Response` does not carry the wire reason phrase, so the reason is the
    /// canonical one for the code, or `Unknown Status` for non-standard codes. The
    /// numeric status is always part of the error.
    fn check_status(
        operation: &'static str,
        endpoint: &Endpoint,
        response: Response<Bytes>,
    ) -> Result<Response<Bytes>> {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown Status");

        if status.is_success() {
            debug!(
                "HTTP request to {} was successful with status code {} and message {}",
                endpoint.url,
                status.as_u16(),
                reason
            );
            Ok(response)
        } else {
            warn!(
                "{} to {} failed with status code {}",
                operation,
                endpoint.url,
                status.as_u16()
            );
            Err(DicomWebError::Status {
                operation,
                status: status.as_u16(),
                reason: reason.to_string(),
            })
        }
    }
}
