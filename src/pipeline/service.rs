use std::sync::Arc;

use dicomweb::{DicomWebClient, HttpTransport};

use crate::config::TransferConfig;
use crate::models::request::DataFlowRequest;
use crate::monitor::Monitor;
use crate::pipeline::errors::TransferError;
use crate::pipeline::executor::TransferExecutor;
use crate::pipeline::factory::{
    DataSinkFactory, DataSourceFactory, DicomWebDataSinkFactory, DicomWebDataSourceFactory,
};
use crate::pipeline::parallel::TransferSummary;

/// Pairs a capable source factory with a capable sink factory and runs the transfer
#[derive(Default)]
pub struct PipelineService {
    source_factories: Vec<Arc<dyn DataSourceFactory>>,
    sink_factories: Vec<Arc<dyn DataSinkFactory>>,
}

impl PipelineService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with the DICOMweb source and sink factories registered
    pub fn dicom_web(
        transport: Arc<dyn HttpTransport>,
        monitor: Arc<dyn Monitor>,
        transfer: &TransferConfig,
    ) -> Self {
        let client = DicomWebClient::new(transport);
        let executor = TransferExecutor::new(transfer.workers);

        let mut service = Self::new();
        service.register_source_factory(Arc::new(DicomWebDataSourceFactory::new(
            client.clone(),
            monitor.clone(),
        )));
        service.register_sink_factory(Arc::new(
            DicomWebDataSinkFactory::new(client, monitor, executor)
                .with_partition_size(transfer.partition_size),
        ));
        service
    }

    pub fn register_source_factory(&mut self, factory: Arc<dyn DataSourceFactory>) {
        self.source_factories.push(factory);
    }

    pub fn register_sink_factory(&mut self, factory: Arc<dyn DataSinkFactory>) {
        self.sink_factories.push(factory);
    }

    fn source_factory(&self, request: &DataFlowRequest) -> Result<&Arc<dyn DataSourceFactory>, TransferError> {
        self.source_factories
            .iter()
            .find(|f| f.can_handle(request))
            .ok_or_else(|| {
                TransferError::validation(format!(
                    "no source factory can handle request {}",
                    request.id
                ))
            })
    }

    fn sink_factory(&self, request: &DataFlowRequest) -> Result<&Arc<dyn DataSinkFactory>, TransferError> {
        self.sink_factories
            .iter()
            .find(|f| f.can_handle(request))
            .ok_or_else(|| {
                TransferError::validation(format!(
                    "no sink factory can handle request {}",
                    request.id
                ))
            })
    }

    pub fn validate(&self, request: &DataFlowRequest) -> Result<(), TransferError> {
        self.source_factory(request)?.validate_request(request)?;
        self.sink_factory(request)?.validate_request(request)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, request), fields(request_id = %request.id))]
    pub async fn transfer(&self, request: &DataFlowRequest) -> Result<TransferSummary, TransferError> {
        self.validate(request)?;

        let mut source = self.source_factory(request)?.create_source(request)?;
        let sink = self.sink_factory(request)?.create_sink(request)?;

        tracing::info!("Transferring request {}", request.id);
        let summary = sink.transfer(source.as_mut()).await?;
        tracing::info!(
            "Request {} transferred {} part(s) in {} batch(es)",
            request.id,
            summary.parts,
            summary.batches
        );
        Ok(summary)
    }
}
