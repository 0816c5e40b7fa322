use std::sync::Arc;

use dicomweb::{DicomWebClient, Endpoint};

use crate::models::address::{
    DataAddress, DEFAULT_SOURCE_NAME, DICOM_WEB_DATA, DICOM_WEB_DATA_PUSH, NAME, PASSWORD, URL,
    USERNAME,
};
use crate::models::request::DataFlowRequest;
use crate::monitor::Monitor;
use crate::pipeline::errors::TransferError;
use crate::pipeline::executor::TransferExecutor;
use crate::pipeline::parallel::{DataSink, ParallelSink, DEFAULT_PARTITION_SIZE};
use crate::pipeline::sink::DicomWebDataSink;
use crate::pipeline::source::{DataSource, DicomWebDataSource};

pub trait DataSourceFactory: Send + Sync {
    fn supported_type(&self) -> &str;
    fn can_handle(&self, request: &DataFlowRequest) -> bool;
    fn validate_request(&self, request: &DataFlowRequest) -> Result<(), TransferError>;
    fn create_source(&self, request: &DataFlowRequest) -> Result<Box<dyn DataSource>, TransferError>;
}

pub trait DataSinkFactory: Send + Sync {
    fn supported_type(&self) -> &str;
    fn can_handle(&self, request: &DataFlowRequest) -> bool;
    fn validate_request(&self, request: &DataFlowRequest) -> Result<(), TransferError>;
    fn create_sink(&self, request: &DataFlowRequest) -> Result<Box<dyn DataSink>, TransferError>;
}

fn required_property<'a>(address: &'a DataAddress, key: &str) -> Result<&'a str, TransferError> {
    address
        .string_property(key)
        .ok_or_else(|| TransferError::validation(format!("missing property '{}'", key)))
}

fn address_or_null(address: Option<&DataAddress>) -> Result<&DataAddress, TransferError> {
    address.ok_or_else(|| TransferError::validation("Data address is null"))
}

/// Strip the variant prefix so the failure reads "Failed to build X: <detail>"
fn build_failure(component: &str, error: TransferError) -> TransferError {
    let detail = match error {
        TransferError::Validation(msg) => msg,
        other => other.to_string(),
    };
    TransferError::validation(format!("Failed to build {}: {}", component, detail))
}

/// Creates WADO-RS sources for `DicomWebData` addresses
#[derive(Debug, Clone)]
pub struct DicomWebDataSourceFactory {
    client: DicomWebClient,
    monitor: Arc<dyn Monitor>,
}

impl DicomWebDataSourceFactory {
    pub fn new(client: DicomWebClient, monitor: Arc<dyn Monitor>) -> Self {
        Self { client, monitor }
    }

    fn build(&self, request: &DataFlowRequest) -> Result<DicomWebDataSource, TransferError> {
        let address = address_or_null(request.source_address.as_ref())?;
        let endpoint = Endpoint::new(
            required_property(address, URL)?,
            required_property(address, USERNAME)?,
            required_property(address, PASSWORD)?,
        );

        DicomWebDataSource::builder()
            .request_id(request.id.as_str())
            .name(address.string_property_or(NAME, DEFAULT_SOURCE_NAME))
            .endpoint(endpoint)
            .client(self.client.clone())
            .monitor(self.monitor.clone())
            .build()
    }
}

impl DataSourceFactory for DicomWebDataSourceFactory {
    fn supported_type(&self) -> &str {
        DICOM_WEB_DATA
    }

    fn can_handle(&self, request: &DataFlowRequest) -> bool {
        request
            .source_address
            .as_ref()
            .is_some_and(|a| a.address_type() == DICOM_WEB_DATA)
    }

    fn validate_request(&self, request: &DataFlowRequest) -> Result<(), TransferError> {
        address_or_null(request.source_address.as_ref())?;
        self.build(request)
            .map(|_| ())
            .map_err(|e| build_failure("DicomWebDataSource", e))
    }

    fn create_source(&self, request: &DataFlowRequest) -> Result<Box<dyn DataSource>, TransferError> {
        Ok(Box::new(self.build(request)?))
    }
}

/// Creates STOW-RS sinks for `DicomWebData` and `DicomWebData-PUSH` addresses
#[derive(Debug, Clone)]
pub struct DicomWebDataSinkFactory {
    client: DicomWebClient,
    monitor: Arc<dyn Monitor>,
    executor: TransferExecutor,
    partition_size: usize,
}

impl DicomWebDataSinkFactory {
    pub fn new(client: DicomWebClient, monitor: Arc<dyn Monitor>, executor: TransferExecutor) -> Self {
        Self {
            client,
            monitor,
            executor,
            partition_size: DEFAULT_PARTITION_SIZE,
        }
    }

    pub fn with_partition_size(mut self, partition_size: usize) -> Self {
        self.partition_size = partition_size;
        self
    }

    fn build(&self, request: &DataFlowRequest) -> Result<ParallelSink, TransferError> {
        let address = address_or_null(request.destination_address.as_ref())?;
        let writer = DicomWebDataSink::builder()
            .request_id(request.id.as_str())
            .url(required_property(address, URL)?)
            .username(required_property(address, USERNAME)?)
            .password(required_property(address, PASSWORD)?)
            .client(self.client.clone())
            .monitor(self.monitor.clone())
            .build()?;

        ParallelSink::builder()
            .writer(Arc::new(writer))
            .executor(self.executor.clone())
            .partition_size(self.partition_size)
            .request_id(request.id.as_str())
            .monitor(self.monitor.clone())
            .build()
    }
}

impl DataSinkFactory for DicomWebDataSinkFactory {
    fn supported_type(&self) -> &str {
        DICOM_WEB_DATA
    }

    fn can_handle(&self, request: &DataFlowRequest) -> bool {
        request.destination_address.as_ref().is_some_and(|a| {
            a.address_type() == DICOM_WEB_DATA || a.address_type() == DICOM_WEB_DATA_PUSH
        })
    }

    fn validate_request(&self, request: &DataFlowRequest) -> Result<(), TransferError> {
        address_or_null(request.destination_address.as_ref())?;
        self.build(request)
            .map(|_| ())
            .map_err(|e| build_failure("DicomWebDataSink", e))
    }

    fn create_sink(&self, request: &DataFlowRequest) -> Result<Box<dyn DataSink>, TransferError> {
        Ok(Box::new(self.build(request)?))
    }
}
