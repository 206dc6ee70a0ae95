//! CSV output formatting
//!
//! One summary row per run, suitable for concatenating across runs and
//! loading into spreadsheet or pandas analysis. Latency columns are empty
//! when no request succeeded.

use crate::stats::RunSummary;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write the run summary as a two-line CSV (header + row)
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create CSV output: {}", path.display()))?;

    writeln!(
        file,
        "total,success,errors,success_percent,retried,retried_success,\
         min_ms,avg_ms,median_ms,p90_ms,max_ms,total_bytes,duration_secs,throughput_mbps"
    )?;

    let latency = match &summary.latency {
        Some(l) => format!(
            "{},{},{},{},{}",
            l.min_ms, l.avg_ms, l.median_ms, l.p90_ms, l.max_ms
        ),
        None => ",,,,".to_string(),
    };

    writeln!(
        file,
        "{},{},{},{},{},{},{},{},{},{:.3}",
        summary.total,
        summary.success,
        summary.errors,
        summary.success_percent,
        summary.retried,
        summary.retried_success,
        latency,
        summary.total_bytes,
        summary.duration_secs,
        summary.throughput_mbps,
    )?;

    Ok(())
}
