//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Complete run configuration
///
/// Validation (`validator::validate_config`) runs before any worker starts;
/// the core components assume a validated config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of concurrent workers
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Stop after this many completed requests (0 = unbounded)
    #[serde(default)]
    pub max_requests: u64,
    /// Stop after this much wall-clock time, in seconds (0 = unbounded)
    #[serde(default)]
    pub max_duration_secs: u64,
    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum resends after a rate-limit response (0 disables retry)
    #[serde(default)]
    pub max_retries: u32,
    /// Base delay for exponential retry backoff, in seconds
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,
    /// Shuffle the target list once before the run
    #[serde(default)]
    pub randomize: bool,
}

fn default_parallelism() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_retry_base_delay_secs() -> u64 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            max_requests: 0,
            max_duration_secs: 0,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
            retry_base_delay_secs: default_retry_base_delay_secs(),
            randomize: false,
        }
    }
}

impl RunConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs(self.retry_base_delay_secs)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// Worst-case wall time of a single target visit: every send hits the
    /// timeout and every backoff delay is taken. This bounds how long a
    /// cooperative stop can lag, and is used as the shutdown grace period.
    pub fn worst_case_visit(&self) -> Duration {
        let sends = self.request_timeout() * (self.max_retries + 1);
        let backoff = if self.max_retries > 0 {
            self.retry_base_delay() * ((1u32 << self.max_retries) - 1)
        } else {
            Duration::ZERO
        };
        sends + backoff
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} worker(s), timeout={}s, retries={} (base delay {}s)",
            self.parallelism, self.request_timeout_secs, self.max_retries, self.retry_base_delay_secs
        )?;
        if self.max_requests > 0 {
            write!(f, ", max_requests={}", self.max_requests)?;
        }
        if self.max_duration_secs > 0 {
            write!(f, ", max_duration={}s", self.max_duration_secs)?;
        }
        if self.randomize {
            write!(f, ", randomized")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_case_visit_without_retries() {
        let config = RunConfig {
            request_timeout_secs: 30,
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.worst_case_visit(), Duration::from_secs(30));
    }

    #[test]
    fn test_worst_case_visit_with_retries() {
        let config = RunConfig {
            request_timeout_secs: 10,
            max_retries: 3,
            retry_base_delay_secs: 1,
            ..Default::default()
        };
        // 4 sends of 10s each plus 1s + 2s + 4s of backoff
        assert_eq!(config.worst_case_visit(), Duration::from_secs(47));
    }

    #[test]
    fn test_display_includes_stop_conditions() {
        let config = RunConfig {
            parallelism: 4,
            max_requests: 100,
            max_duration_secs: 60,
            ..Default::default()
        };
        let rendered = config.to_string();
        assert!(rendered.contains("max_requests=100"));
        assert!(rendered.contains("max_duration=60s"));
    }
}
