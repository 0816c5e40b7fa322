//! Reporting capability handed to sources and sinks

use std::fmt::Debug;

/// Sink for transfer progress and failure reports
pub trait Monitor: Send + Sync + Debug {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn severe(&self, message: &str);
}

/// Forwards reports to `tracing` under the `dicomweb_plane::monitor` target
#[derive(Debug, Default, Clone)]
pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "dicomweb_plane::monitor", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "dicomweb_plane::monitor", "{}", message);
    }

    fn severe(&self, message: &str) {
        tracing::error!(target: "dicomweb_plane::monitor", "{}", message);
    }
}
