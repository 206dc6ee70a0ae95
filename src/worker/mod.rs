//! Worker loop
//!
//! A worker repeatedly pulls the next target from the shared queue, executes
//! one visit, and appends the outcome to the result sink, until the shared
//! stop flag is observed. The flag is checked only at the top of each
//! iteration: a worker already inside a visit (including mid-backoff)
//! finishes it before stopping. Termination is therefore cooperative with a
//! latency bound of one worst-case visit; the pool's grace timeout covers
//! exactly that bound before escalating to abort.

pub mod pool;

use crate::executor::RequestExecutor;
use crate::sink::ResultSink;
use crate::target::TargetQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One concurrently scheduled execution unit
///
/// Each worker owns a private cursor into the shared queue, starting at
/// zero. Workers all start from the first target; only latency jitter
/// desynchronizes them over time.
pub struct Worker {
    id: usize,
    queue: Arc<TargetQueue>,
    executor: Arc<RequestExecutor>,
    sink: Arc<ResultSink>,
    stop: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(
        id: usize,
        queue: Arc<TargetQueue>,
        executor: Arc<RequestExecutor>,
        sink: Arc<ResultSink>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            queue,
            executor,
            sink,
            stop,
        }
    }

    /// Run until the stop flag is set. Returns the number of visits this
    /// worker completed and recorded.
    pub async fn run(self) -> u64 {
        let mut cursor: u64 = 0;
        let mut visits: u64 = 0;

        tracing::debug!(worker_id = self.id, "worker started");

        while !self.stop.load(Ordering::Relaxed) {
            let target = self.queue.get(cursor);
            cursor += 1;

            let record = self.executor.execute(target).await;
            if let Err(err) = self.sink.append(&record) {
                tracing::error!(worker_id = self.id, error = %err, "result append failed, worker stopping");
                break;
            }
            visits += 1;
        }

        tracing::debug!(worker_id = self.id, visits, "worker finished");
        visits
    }
}
