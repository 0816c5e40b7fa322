use std::sync::Arc;

use async_trait::async_trait;
use dicomweb::{DicomWebClient, Endpoint};

use crate::monitor::Monitor;
use crate::pipeline::errors::TransferError;
use crate::pipeline::part::Part;

/// Writes one batch of parts to a destination
#[async_trait]
pub trait PartsWriter: Send + Sync {
    async fn transfer_parts(&self, parts: Vec<Part>) -> Result<(), TransferError>;
}

/// Uploads each batch with a single STOW-RS request
#[derive(Debug, Clone)]
pub struct DicomWebDataSink {
    request_id: String,
    endpoint: Endpoint,
    client: DicomWebClient,
    monitor: Arc<dyn Monitor>,
}

impl DicomWebDataSink {
    pub fn builder() -> DicomWebDataSinkBuilder {
        DicomWebDataSinkBuilder::default()
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

#[async_trait]
impl PartsWriter for DicomWebDataSink {
    #[tracing::instrument(skip(self, parts), fields(request_id = %self.request_id, parts = parts.len()))]
    async fn transfer_parts(&self, parts: Vec<Part>) -> Result<(), TransferError> {
        let mut objects = Vec::with_capacity(parts.len());
        for part in parts {
            let name = part.name().to_string();
            match part.read_all().await {
                Ok(data) => objects.push(data),
                Err(e) => {
                    self.monitor
                        .severe(&format!("Error reading DICOM data {}: {}", name, e));
                    return Err(TransferError::part_read(name, e));
                }
            }
        }

        match self.client.store(&self.endpoint, objects).await {
            Ok(response) => {
                self.monitor.debug(&format!(
                    "STOW-RS response for request {}: {}",
                    self.request_id, response
                ));
                Ok(())
            }
            Err(e) => {
                self.monitor.severe(&format!(
                    "Error writing DICOM data to endpoint {}: {}",
                    self.endpoint.url, e
                ));
                Err(TransferError::from(e))
            }
        }
    }
}

#[derive(Default)]
pub struct DicomWebDataSinkBuilder {
    request_id: Option<String>,
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    client: Option<DicomWebClient>,
    monitor: Option<Arc<dyn Monitor>>,
}

impl DicomWebDataSinkBuilder {
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn endpoint(self, endpoint: Endpoint) -> Self {
        self.url(endpoint.url)
            .username(endpoint.username)
            .password(endpoint.password)
    }

    pub fn client(mut self, client: DicomWebClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn build(self) -> Result<DicomWebDataSink, TransferError> {
        let required = |value: Option<String>, field: &str| {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| TransferError::validation(format!("{} is required", field)))
        };

        let request_id = self
            .request_id
            .ok_or_else(|| TransferError::validation("request id is required"))?;
        let endpoint = Endpoint::new(
            required(self.url, "url")?,
            required(self.username, "username")?,
            required(self.password, "password")?,
        );
        endpoint
            .validate()
            .map_err(|e| TransferError::validation(e.to_string()))?;

        let client = self
            .client
            .ok_or_else(|| TransferError::validation("DICOMweb client is required"))?;
        let monitor = self
            .monitor
            .ok_or_else(|| TransferError::validation("monitor is required"))?;

        Ok(DicomWebDataSink {
            request_id,
            endpoint,
            client,
            monitor,
        })
    }
}
