//! Worker pool lifecycle
//!
//! The pool owns the run's worker tasks and the shared stop flag. Shutdown
//! is two-phase: `stop_all` flips the flag (one-way, never reset), then
//! `await_all` waits out a grace period for voluntary exits and aborts
//! whatever is still running. Aborted workers' in-flight requests are
//! abandoned and never produce a record.

use crate::executor::RequestExecutor;
use crate::sink::ResultSink;
use crate::target::TargetQueue;
use crate::worker::Worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Fixed-size pool of concurrently running workers
pub struct WorkerPool {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<u64>>,
    started_at: Instant,
}

impl WorkerPool {
    /// Launch `parallelism` workers sharing one queue, one sink, and one
    /// stop flag.
    pub fn start(
        parallelism: usize,
        queue: Arc<TargetQueue>,
        executor: Arc<RequestExecutor>,
        sink: Arc<ResultSink>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let started_at = Instant::now();

        let handles = (0..parallelism)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&executor),
                    Arc::clone(&sink),
                    Arc::clone(&stop),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        tracing::info!(parallelism, "worker pool started");

        Self {
            stop,
            handles,
            started_at,
        }
    }

    /// Signal all workers to stop. Idempotent; the flag never resets.
    pub fn stop_all(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// When the pool was started, for elapsed-time stop checks.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait up to `grace` for voluntary exits, then abort stragglers.
    ///
    /// Returns the total number of visits completed by workers that exited
    /// on their own.
    pub async fn await_all(self, grace: Duration) -> u64 {
        let deadline = Instant::now() + grace;
        let mut visits: u64 = 0;

        for (id, mut handle) in self.handles.into_iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok(count)) => visits += count,
                Ok(Err(err)) => {
                    tracing::error!(worker_id = id, error = %err, "worker task failed");
                }
                Err(_) => {
                    tracing::warn!(worker_id = id, "grace period expired, aborting worker");
                    handle.abort();
                    // Observe the cancellation so the task is fully torn
                    // down before the sink is read.
                    let _ = handle.await;
                }
            }
        }

        visits
    }
}
