use std::sync::Arc;

use async_trait::async_trait;
use dicomweb::{DicomWebClient, Endpoint, APPLICATION_DICOM};
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::models::address::DEFAULT_SOURCE_NAME;
use crate::monitor::Monitor;
use crate::pipeline::errors::TransferError;
use crate::pipeline::part::Part;

pub type PartStreamResult = Result<BoxStream<'static, Part>, TransferError>;

/// Produces the parts of one transfer
#[async_trait]
pub trait DataSource: Send {
    async fn open_part_stream(&mut self) -> PartStreamResult;

    /// Release held resources. Never fails and may be called repeatedly.
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Idle,
    Streaming,
    Closed,
}

/// Pulls a WADO-RS bundle and exposes each decoded object as a part
#[derive(Debug)]
pub struct DicomWebDataSource {
    request_id: String,
    name: String,
    endpoint: Endpoint,
    client: DicomWebClient,
    monitor: Arc<dyn Monitor>,
    state: SourceState,
}

impl DicomWebDataSource {
    pub fn builder() -> DicomWebDataSourceBuilder {
        DicomWebDataSourceBuilder::default()
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

#[async_trait]
impl DataSource for DicomWebDataSource {
    #[tracing::instrument(skip(self), fields(request_id = %self.request_id, url = %self.endpoint.url))]
    async fn open_part_stream(&mut self) -> PartStreamResult {
        if self.state == SourceState::Closed {
            return Err(TransferError::internal(format!(
                "source for request {} is already closed",
                self.request_id
            )));
        }

        let objects = match self.client.retrieve(&self.endpoint).await {
            Ok(objects) => objects,
            Err(e) => {
                let error = TransferError::from_client("Failed to retrieve data from PACS: ", e);
                self.monitor.severe(&error.to_string());
                return Err(error);
            }
        };

        self.monitor.debug(&format!(
            "Retrieved {} object(s) for request {}",
            objects.len(),
            self.request_id
        ));
        self.state = SourceState::Streaming;

        let name = self.name.clone();
        let parts = stream::iter(objects)
            .map(move |data| Part::from_bytes(name.clone(), APPLICATION_DICOM, data))
            .boxed();
        Ok(parts)
    }

    fn close(&mut self) {
        self.state = SourceState::Closed;
    }
}

/// Collects the pieces of a [`DicomWebDataSource`] and checks them in `build`
#[derive(Default)]
pub struct DicomWebDataSourceBuilder {
    request_id: Option<String>,
    name: Option<String>,
    endpoint: Option<Endpoint>,
    client: Option<DicomWebClient>,
    monitor: Option<Arc<dyn Monitor>>,
}

impl DicomWebDataSourceBuilder {
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn client(mut self, client: DicomWebClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn build(self) -> Result<DicomWebDataSource, TransferError> {
        let request_id = self
            .request_id
            .ok_or_else(|| TransferError::validation("request id is required"))?;
        let client = self
            .client
            .ok_or_else(|| TransferError::validation("DICOMweb client is required"))?;
        let monitor = self
            .monitor
            .ok_or_else(|| TransferError::validation("monitor is required"))?;
        let endpoint = self
            .endpoint
            .ok_or_else(|| TransferError::validation("endpoint is required"))?;
        endpoint
            .validate()
            .map_err(|e| TransferError::validation(e.to_string()))?;

        Ok(DicomWebDataSource {
            request_id,
            name: self.name.unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            endpoint,
            client,
            monitor,
            state: SourceState::Idle,
        })
    }
}
