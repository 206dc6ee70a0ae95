//! CLI argument parsing using clap

use super::RunConfig;
use crate::Result;
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

/// fetchpulse - Concurrent HTTP retrieval load generator
#[derive(Parser, Debug)]
#[command(name = "fetchpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File with one target URI per line ('#' comments and blank lines skipped)
    #[arg(value_name = "TARGETS_FILE")]
    pub targets: PathBuf,

    /// TOML run configuration file (individual flags are ignored when set)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Run Options ===
    /// Number of concurrent workers
    #[arg(short = 'p', long, default_value = "1")]
    pub parallelism: usize,

    /// Stop after this many completed requests (0 = unbounded)
    #[arg(short = 'n', long, default_value = "0")]
    pub max_requests: u64,

    /// Stop after this many seconds of wall-clock time (0 = unbounded)
    #[arg(short = 'd', long, default_value = "0")]
    pub max_duration: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout: u64,

    /// Maximum resends after a 429 response (0 disables retry)
    #[arg(long, default_value = "0")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in seconds
    #[arg(long, default_value = "1")]
    pub retry_base_delay: u64,

    /// Shuffle the target list once before the run
    #[arg(long)]
    pub randomize: bool,

    // === Auth Options ===
    /// Bearer token injected on every request
    #[arg(long, env = "FETCHPULSE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    // === Output Options ===
    /// Result sink path (one JSON record per attempt)
    #[arg(long, default_value = "results.jsonl")]
    pub sink: PathBuf,

    /// Write the summary as CSV to this path
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    /// Write the summary as JSON to this path
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Disable the live progress line
    #[arg(long)]
    pub no_live: bool,

    // === Runtime Options ===
    /// Validate configuration and targets, then exit without sending requests
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the run configuration: the TOML file when given, otherwise
    /// the individual flags.
    pub fn run_config(&self) -> Result<RunConfig> {
        if let Some(path) = &self.config {
            return super::toml::load_config(path);
        }
        Ok(RunConfig {
            parallelism: self.parallelism,
            max_requests: self.max_requests,
            max_duration_secs: self.max_duration,
            request_timeout_secs: self.timeout,
            max_retries: self.max_retries,
            retry_base_delay_secs: self.retry_base_delay,
            randomize: self.randomize,
        })
    }
}

/// Load raw target URIs from a file, one per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Order is
/// preserved - it defines the stable target indices.
pub fn load_targets(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read targets file: {}", path.display()))?;
    let targets = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(targets)
}
