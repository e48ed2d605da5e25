//! Tokio-backed execution context for detached tasks.

use std::sync::Mutex;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use pride_core::ExecutionContext;

/// Tracks detached tasks spawned onto the tokio runtime.
///
/// Registered tasks keep running after the response has been returned;
/// the response path never waits on them. Handles are retained so the
/// process can await quiescence on shutdown and tests can await
/// background work deterministically.
#[derive(Debug, Default)]
pub struct TokioSpawner {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioSpawner {
    /// Create a spawner with no tracked tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every registered task, including tasks registered while
    /// draining (a revalidation registers its own store write).
    pub async fn drained(&self) {
        loop {
            let batch: Vec<_> = {
                let mut handles = self.lock();
                handles.drain(..).collect()
            };
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                // A panicked background task already logged its own
                // failure; draining must not propagate it.
                let _ = handle.await;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ExecutionContext for TokioSpawner {
    fn wait_until(&self, task: BoxFuture<'static, ()>) {
        let handle = tokio::spawn(task);
        self.lock().push(handle);
    }
}
