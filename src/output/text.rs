//! Human-readable text output

use crate::controller::RunOutcome;
use crate::stats::RunSummary;

/// Print run results to console
pub fn print_summary(summary: &RunSummary, outcome: &RunOutcome) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    RUN RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Completed at: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Stopped on:   {:?} after {:.3}s", outcome.reason, outcome.elapsed.as_secs_f64());
    println!();

    println!("Requests:");
    println!("  Total:   {}", summary.total);
    println!(
        "  Success: {} ({}%)",
        summary.success, summary.success_percent
    );
    println!("  Errors:  {}", summary.errors);
    if summary.retried > 0 {
        println!(
            "  Retried: {} ({} eventually succeeded)",
            summary.retried, summary.retried_success
        );
    }
    println!();

    println!("Throughput:");
    println!("  Bytes:   {}", format_bytes(summary.total_bytes));
    println!("  Rate:    {:.2} Mbit/s over {}s", summary.throughput_mbps, summary.duration_secs);
    println!();

    println!("Latency (successful requests):");
    match &summary.latency {
        Some(latency) => {
            println!("  Min:    {} ms", latency.min_ms);
            println!("  Avg:    {} ms", latency.avg_ms);
            println!("  Median: {} ms", latency.median_ms);
            println!("  P90:    {} ms", latency.p90_ms);
            println!("  Max:    {} ms", latency.max_ms);
        }
        None => println!("  No successful requests"),
    }

    if !summary.error_breakdown.is_empty() {
        println!();
        println!("Errors by status:");
        for (status, count) in &summary.error_breakdown {
            println!("  {}: {}", status, count);
        }

        println!();
        println!("Targets with most errors:");
        for entry in &summary.top_error_targets {
            println!("  target {}: {} error(s)", entry.target_index, entry.count);
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.00KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00GB");
    }
}
