use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::monitor::Monitor;
use crate::pipeline::errors::TransferError;
use crate::pipeline::executor::TransferExecutor;
use crate::pipeline::sink::PartsWriter;
use crate::pipeline::source::DataSource;

pub const DEFAULT_PARTITION_SIZE: usize = 5;

/// Outcome of a fully successful transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    pub batches: usize,
    pub parts: usize,
}

/// Consumes a source and writes its parts to a destination
#[async_trait]
pub trait DataSink: Send + Sync {
    async fn transfer(&self, source: &mut dyn DataSource) -> Result<TransferSummary, TransferError>;
}

/// Splits a part stream into batches and writes them concurrently
///
/// The source is closed on every exit path. Batches that finished before a
/// sibling failed stay written.
pub struct ParallelSink {
    writer: Arc<dyn PartsWriter>,
    executor: TransferExecutor,
    partition_size: usize,
    request_id: String,
    monitor: Arc<dyn Monitor>,
}

impl std::fmt::Debug for ParallelSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelSink")
            .field("request_id", &self.request_id)
            .field("partition_size", &self.partition_size)
            .field("workers", &self.executor.workers())
            .finish_non_exhaustive()
    }
}

impl ParallelSink {
    pub fn builder() -> ParallelSinkBuilder {
        ParallelSinkBuilder::default()
    }

    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    #[tracing::instrument(skip(self, source), fields(request_id = %self.request_id))]
    async fn run(&self, source: &mut dyn DataSource) -> Result<TransferSummary, TransferError> {
        let mut batches = source.open_part_stream().await?.chunks(self.partition_size);

        let mut handles: Vec<JoinHandle<Result<(), TransferError>>> = Vec::new();
        let mut parts = 0;
        while let Some(batch) = batches.next().await {
            parts += batch.len();
            let writer = self.writer.clone();
            let handle = self
                .executor
                .spawn(async move { writer.transfer_parts(batch).await })
                .await
                .map_err(|e| TransferError::internal(format!("executor unavailable: {}", e)))?;
            handles.push(handle);
        }

        let total = handles.len();
        let mut failures = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(e) => failures.push(TransferError::internal(format!(
                    "batch worker failed: {}",
                    e
                ))),
            }
        }

        match failures.len() {
            0 => Ok(TransferSummary {
                batches: total,
                parts,
            }),
            1 => Err(failures.remove(0)),
            _ => Err(TransferError::BatchesFailed { total, failures }),
        }
    }
}

#[async_trait]
impl DataSink for ParallelSink {
    async fn transfer(&self, source: &mut dyn DataSource) -> Result<TransferSummary, TransferError> {
        self.monitor
            .info(&format!("Starting transfer for request {}", self.request_id));

        let result = self.run(source).await;
        source.close();

        match &result {
            Ok(summary) => self.monitor.info(&format!(
                "Transfer for request {} finished: {} part(s) in {} batch(es)",
                self.request_id, summary.parts, summary.batches
            )),
            Err(e) => self.monitor.severe(&format!(
                "Transfer for request {} failed: {}",
                self.request_id, e
            )),
        }
        result
    }
}

#[derive(Default)]
pub struct ParallelSinkBuilder {
    writer: Option<Arc<dyn PartsWriter>>,
    executor: Option<TransferExecutor>,
    partition_size: Option<usize>,
    request_id: Option<String>,
    monitor: Option<Arc<dyn Monitor>>,
}

impl ParallelSinkBuilder {
    pub fn writer(mut self, writer: Arc<dyn PartsWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn executor(mut self, executor: TransferExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn partition_size(mut self, partition_size: usize) -> Self {
        self.partition_size = Some(partition_size);
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn build(self) -> Result<ParallelSink, TransferError> {
        let partition_size = self.partition_size.unwrap_or(DEFAULT_PARTITION_SIZE);
        if partition_size == 0 {
            return Err(TransferError::validation(
                "partition size must be greater than 0",
            ));
        }

        Ok(ParallelSink {
            writer: self
                .writer
                .ok_or_else(|| TransferError::validation("parts writer is required"))?,
            executor: self
                .executor
                .ok_or_else(|| TransferError::validation("executor is required"))?,
            partition_size,
            request_id: self
                .request_id
                .ok_or_else(|| TransferError::validation("request id is required"))?,
            monitor: self
                .monitor
                .ok_or_else(|| TransferError::validation("monitor is required"))?,
        })
    }
}
