//! Run summary statistics
//!
//! Reduces the completed result stream into the run report: totals, retry
//! metrics, latency order statistics over successful requests, throughput,
//! and an error breakdown attributing failures back to target indices.
//!
//! The reduction is a pure function over the record slice. Latency
//! statistics are exact order statistics over the sorted successful
//! latencies (not histogram approximations): median is the middle element
//! (mean of the two central elements for an even count), p90 is the element
//! at 1-based index `max(1, ceil(n * 90 / 100))`.

use crate::sink::AttemptResult;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

/// How many target indices to rank in the error attribution list
const TOP_ERROR_TARGETS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    /// The run completed but left nothing to summarize.
    #[error("result sink contains no records")]
    EmptyResults,
}

/// Latency order statistics over successful requests, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub min_ms: u64,
    pub max_ms: u64,
    /// Arithmetic mean, rounded to the nearest millisecond
    pub avg_ms: u64,
    pub median_ms: u64,
    pub p90_ms: u64,
}

/// Error count attributed to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetErrorCount {
    pub target_index: usize,
    pub count: u64,
}

/// Computed summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: u64,
    pub success: u64,
    pub errors: u64,
    pub success_percent: u64,
    pub retried: u64,
    pub retried_success: u64,
    /// Omitted entirely when there were no successful requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySummary>,
    /// Payload bytes over successful requests
    pub total_bytes: u64,
    pub duration_secs: u64,
    /// Megabits per second over the whole run (0 when nothing succeeded or
    /// the duration rounds to zero seconds)
    pub throughput_mbps: f64,
    /// Failure count per non-200 status, in status order
    pub error_breakdown: BTreeMap<String, u64>,
    /// Targets most frequently present among errors, count-descending
    pub top_error_targets: Vec<TargetErrorCount>,
}

impl RunSummary {
    /// Reduce the completed record set into the run report.
    pub fn from_records(
        records: &[AttemptResult],
        duration: Duration,
    ) -> Result<Self, StatsError> {
        if records.is_empty() {
            return Err(StatsError::EmptyResults);
        }

        let total = records.len() as u64;
        let success = records.iter().filter(|r| r.is_success()).count() as u64;
        let errors = total - success;
        let retried = records.iter().filter(|r| r.retry_count > 0).count() as u64;
        let retried_success = records
            .iter()
            .filter(|r| r.is_success() && r.retry_count > 0)
            .count() as u64;

        let latency = latency_summary(records);

        let total_bytes: u64 = records
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.bytes_downloaded)
            .sum();
        let duration_secs = duration.as_secs();
        let throughput_mbps = if success == 0 || duration_secs == 0 {
            0.0
        } else {
            (total_bytes * 8) as f64 / (duration_secs as f64 * 1_000_000.0)
        };

        let mut error_breakdown: BTreeMap<String, u64> = BTreeMap::new();
        let mut errors_per_target: HashMap<usize, u64> = HashMap::new();
        for record in records.iter().filter(|r| !r.is_success()) {
            *error_breakdown.entry(record.http_status.clone()).or_insert(0) += 1;
            *errors_per_target.entry(record.target_index).or_insert(0) += 1;
        }

        let mut top_error_targets: Vec<TargetErrorCount> = errors_per_target
            .into_iter()
            .map(|(target_index, count)| TargetErrorCount {
                target_index,
                count,
            })
            .collect();
        top_error_targets
            .sort_by(|a, b| b.count.cmp(&a.count).then(a.target_index.cmp(&b.target_index)));
        top_error_targets.truncate(TOP_ERROR_TARGETS);

        Ok(Self {
            total,
            success,
            errors,
            success_percent: success * 100 / total,
            retried,
            retried_success,
            latency,
            total_bytes,
            duration_secs,
            throughput_mbps,
            error_breakdown,
            top_error_targets,
        })
    }
}

/// Order statistics over the successful latencies, or None if none succeeded.
fn latency_summary(records: &[AttemptResult]) -> Option<LatencySummary> {
    let mut latencies: Vec<u64> = records
        .iter()
        .filter(|r| r.is_success())
        .map(|r| r.latency_ms)
        .collect();
    if latencies.is_empty() {
        return None;
    }
    latencies.sort_unstable();

    let n = latencies.len();
    let sum: u64 = latencies.iter().sum();
    let avg_ms = (sum + n as u64 / 2) / n as u64;

    let median_ms = if n % 2 == 1 {
        latencies[n / 2]
    } else {
        (latencies[n / 2 - 1] + latencies[n / 2]) / 2
    };

    // 1-based index max(1, ceil(n * 90 / 100))
    let p90_index = ((n * 90).div_ceil(100)).max(1);
    let p90_ms = latencies[p90_index - 1];

    Some(LatencySummary {
        min_ms: latencies[0],
        max_ms: latencies[n - 1],
        avg_ms,
        median_ms,
        p90_ms,
    })
}
