pub mod errors;
pub mod executor;
pub mod factory;
pub mod parallel;
pub mod part;
pub mod service;
pub mod sink;
pub mod source;


// Re-exports for convenience
pub use errors::TransferError;
pub use executor::TransferExecutor;
pub use factory::{
    DataSinkFactory, DataSourceFactory, DicomWebDataSinkFactory, DicomWebDataSourceFactory,
};
pub use parallel::{DataSink, ParallelSink, TransferSummary};
pub use part::Part;
pub use service::PipelineService;
pub use sink::{DicomWebDataSink, PartsWriter};
pub use source::{DataSource, DicomWebDataSource, SourceState};
