//! Request execution with retry and backoff
//!
//! The executor performs one target visit: send the request, and on a
//! rate-limit response sleep and resend up to the configured retry budget.
//! Whatever the visit ends on - success, a non-retryable status, the
//! sentinel no-response code, or retry exhaustion - it yields exactly one
//! [`AttemptResult`]. Per-attempt failures are recorded, never raised: the
//! run's job is to characterize failure rates, not to halt on them.
//!
//! Backoff is `retry_base_delay * 2^attempt`, exponential purely in the
//! retry count and un-jittered, so retry timing is reproducible across runs.

use crate::config::RunConfig;
use crate::sink::AttemptResult;
use crate::target::Target;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Executes single target visits against a shared transport
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, config: &RunConfig) -> Self {
        Self {
            transport,
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay(),
        }
    }

    /// Perform one visit of `target`, including internal retries.
    ///
    /// `latency_ms` covers the whole visit from the first send, backoff
    /// sleeps included. `retry_count` is the number of resends performed;
    /// with `max_retries = 0` the first rate-limit response is terminal and
    /// no sleep occurs.
    pub async fn execute(&self, target: &Target) -> AttemptResult {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let outcome = self.transport.send(&target.uri, self.timeout).await;

            if outcome.is_rate_limited() && self.max_retries > 0 && attempt < self.max_retries {
                // Validation caps max_retries well below the shift width.
                let delay = self.retry_base_delay * (1u32 << attempt);
                tracing::debug!(
                    target_index = target.index,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return AttemptResult {
                http_status: outcome.status,
                latency_ms: start.elapsed().as_millis() as u64,
                retry_count: attempt,
                target_index: target.index,
                bytes_downloaded: outcome.bytes,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SendOutcome;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays a scripted sequence of outcomes and records
    /// when each send happened (on the test clock).
    struct ScriptedTransport {
        script: Mutex<VecDeque<SendOutcome>>,
        send_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<SendOutcome>) -> Self {
            Self {
                script: Mutex::new(outcomes.into()),
                send_times: Mutex::new(Vec::new()),
            }
        }

        fn send_times(&self) -> Vec<Instant> {
            self.send_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, _uri: &str, _timeout: Duration) -> SendOutcome {
            self.send_times.lock().unwrap().push(Instant::now());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted transport exhausted")
        }
    }

    fn config(max_retries: u32, retry_base_delay_secs: u64) -> RunConfig {
        RunConfig {
            parallelism: 1,
            max_requests: 1,
            max_duration_secs: 0,
            request_timeout_secs: 60,
            max_retries,
            retry_base_delay_secs,
            randomize: false,
        }
    }

    fn target() -> Target {
        Target {
            index: 7,
            uri: "https://store.example/studies/7".to_string(),
        }
    }

    fn executor(transport: &Arc<ScriptedTransport>, cfg: &RunConfig) -> RequestExecutor {
        RequestExecutor::new(Arc::clone(transport) as Arc<dyn Transport>, cfg)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = Arc::new(ScriptedTransport::new(vec![SendOutcome::new("200", 2048)]));
        let result = executor(&transport, &config(3, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "200");
        assert_eq!(result.retry_count, 0);
        assert_eq!(result.target_index, 7);
        assert_eq!(result.bytes_downloaded, 2048);
        assert_eq!(transport.send_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sequence_is_exponential() {
        // 429, 429, 429, then success: delays before resends must be
        // exactly 1s, 2s, 4s.
        let transport = Arc::new(ScriptedTransport::new(vec![
            SendOutcome::new("429", 0),
            SendOutcome::new("429", 0),
            SendOutcome::new("429", 0),
            SendOutcome::new("200", 1024),
        ]));
        let result = executor(&transport, &config(3, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "200");
        assert_eq!(result.retry_count, 3);
        assert_eq!(result.latency_ms, 7_000);

        let times = transport.send_times();
        assert_eq!(times.len(), 4);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
        assert_eq!(times[3] - times[2], Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_stops_retrying_immediately() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            SendOutcome::new("429", 0),
            SendOutcome::new("200", 512),
        ]));
        let result = executor(&transport, &config(3, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "200");
        assert_eq!(result.retry_count, 1);
        assert_eq!(transport.send_times().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_records_failure() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            SendOutcome::new("429", 0),
            SendOutcome::new("429", 0),
            SendOutcome::new("429", 0),
        ]));
        let result = executor(&transport, &config(2, 1)).execute(&target()).await;

        // Exhaustion converts the rate limit into a recorded failure.
        assert_eq!(result.http_status, "429");
        assert_eq!(result.retry_count, 2);
        assert_eq!(result.latency_ms, 3_000); // 1s + 2s of backoff
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_first_rate_limit_terminal() {
        let transport = Arc::new(ScriptedTransport::new(vec![SendOutcome::new("429", 0)]));
        let result = executor(&transport, &config(0, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "429");
        assert_eq!(result.retry_count, 0);
        assert_eq!(result.latency_ms, 0); // no sleep happened
        assert_eq!(transport.send_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limit_errors_are_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![SendOutcome::new("503", 0)]));
        let result = executor(&transport, &config(3, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "503");
        assert_eq!(result.retry_count, 0);
        assert_eq!(transport.send_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_records_sentinel_status() {
        let transport = Arc::new(ScriptedTransport::new(vec![SendOutcome::no_response()]));
        let result = executor(&transport, &config(3, 1)).execute(&target()).await;

        assert_eq!(result.http_status, "000");
        assert_eq!(result.retry_count, 0);
        assert_eq!(result.bytes_downloaded, 0);
    }
}
