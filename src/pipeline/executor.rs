use std::future::Future;
use std::sync::Arc;

use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinHandle;

/// Task spawner with a fixed bound on concurrently running tasks
///
/// Clones share the same bound, so one executor can be handed to several sinks.
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl TransferExecutor {
    /// A bound of zero is raised to one
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wait for a free worker, then spawn the task holding it until the task ends
    pub async fn spawn<F>(&self, task: F) -> Result<JoinHandle<F::Output>, AcquireError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = self.permits.clone().acquire_owned().await?;
        Ok(tokio::spawn(async move {
            let output = task.await;
            drop(permit);
            output
        }))
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for TransferExecutor {
    fn default() -> Self {
        Self::new(4)
    }
}
