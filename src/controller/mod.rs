//! Run supervision and stop control
//!
//! A single supervisory loop - never a worker - polls the sink's completed
//! count and the elapsed wall time once per interval, and halts the run when
//! either configured limit is reached. Both limits are evaluated every poll
//! with OR semantics: whichever is reached first wins. The transition is
//! one-way (RUNNING to STOPPED, never back).
//!
//! This poll is the sole clock-driven cancellation check in the harness, so
//! stop latency is bounded by one poll interval plus one worst-case visit
//! (timeout and backoff included). There is no instantaneous cancellation
//! on the cooperative path; only the post-grace abort discards work.

use crate::config::RunConfig;
use crate::sink::ResultSink;
use crate::worker::pool::WorkerPool;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a supervised run ended on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    RequestLimit,
    DurationLimit,
}

/// Final accounting of a supervised run
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    /// Why the run stopped
    pub reason: StopReason,
    /// Visits completed by workers that exited voluntarily
    pub visits: u64,
    /// Wall time from pool start until all workers were down
    pub elapsed: Duration,
}

/// Observes run progress and halts the pool at the configured limits
pub struct StopController {
    max_requests: u64,
    max_duration: Duration,
    grace: Duration,
    live: bool,
}

impl StopController {
    /// Build a controller from a validated config.
    ///
    /// The grace period for shutdown is the worst-case duration of a single
    /// visit, which is exactly how long a cooperative stop can lag.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            max_duration: config.max_duration(),
            grace: config.worst_case_visit(),
            live: false,
        }
    }

    /// Enable the live progress line printed on each poll tick.
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Poll until a limit is reached, then stop the pool and wait it out.
    pub async fn supervise(&self, pool: WorkerPool, sink: &ResultSink) -> RunOutcome {
        let started = pool.started_at();
        // First poll happens one interval after start, not immediately.
        let mut interval =
            tokio::time::interval_at(started + POLL_INTERVAL, POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            interval.tick().await;

            let count = sink.completed();
            let elapsed = started.elapsed();

            if self.live {
                let rate = count as f64 / elapsed.as_secs_f64().max(1.0);
                println!(
                    "  {:>8} requests  {:>6.0}s elapsed  {:>8.1} req/s",
                    count,
                    elapsed.as_secs_f64(),
                    rate
                );
            }

            if let Some(reason) = self.limit_reached(count, elapsed) {
                tracing::info!(?reason, count, elapsed_secs = elapsed.as_secs(), "stop limit reached");
                break reason;
            }
        };

        pool.stop_all();
        let visits = pool.await_all(self.grace).await;
        let elapsed = started.elapsed();

        RunOutcome {
            reason,
            visits,
            elapsed,
        }
    }

    fn limit_reached(&self, count: u64, elapsed: Duration) -> Option<StopReason> {
        if self.max_requests > 0 && count >= self.max_requests {
            return Some(StopReason::RequestLimit);
        }
        if !self.max_duration.is_zero() && elapsed >= self.max_duration {
            return Some(StopReason::DurationLimit);
        }
        None
    }
}
