//! Data plane that moves DICOM objects between a pipeline and DICOMweb archives
//!
//! A [`pipeline::DicomWebDataSource`] pulls a WADO-RS bundle and exposes every
//! object as a [`pipeline::Part`]; a [`pipeline::ParallelSink`] splits a part
//! stream into batches and uploads each one with a STOW-RS request through a
//! [`pipeline::DicomWebDataSink`]. [`pipeline::PipelineService`] pairs the two
//! from a [`models::DataFlowRequest`].

pub mod config;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod pipeline;

pub use dicomweb;
