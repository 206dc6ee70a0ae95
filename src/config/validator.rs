//! Configuration validation
//!
//! All validation happens before any worker starts; the core never runs
//! with an invalid config.

use super::RunConfig;
use crate::target::Target;
use anyhow::Result;

/// Retry budget ceiling; keeps the exponential backoff factor sane.
const MAX_RETRIES_LIMIT: u32 = 16;

/// Validate the run configuration
pub fn validate_config(config: &RunConfig) -> Result<()> {
    if config.parallelism == 0 {
        anyhow::bail!("parallelism must be at least 1");
    }

    if config.max_requests == 0 && config.max_duration_secs == 0 {
        anyhow::bail!(
            "at least one stop condition is required: set max_requests and/or max_duration_secs"
        );
    }

    if config.request_timeout_secs == 0 {
        anyhow::bail!("request_timeout_secs must be greater than 0");
    }

    if config.max_retries > MAX_RETRIES_LIMIT {
        anyhow::bail!(
            "max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT,
            config.max_retries
        );
    }

    if config.max_retries > 0 && config.retry_base_delay_secs == 0 {
        anyhow::bail!("retry_base_delay_secs must be at least 1 when retries are enabled");
    }

    // Warn if worker count is very high
    if config.parallelism > 1024 {
        eprintln!(
            "Warning: Very high worker count ({}), this may cause performance issues",
            config.parallelism
        );
    }

    Ok(())
}

/// Validate the loaded target list
pub fn validate_targets(targets: &[Target]) -> Result<()> {
    if targets.is_empty() {
        anyhow::bail!("At least one target URI must be specified");
    }

    for target in targets {
        if !target.uri.starts_with("http://") && !target.uri.starts_with("https://") {
            anyhow::bail!(
                "Target {} has an invalid store path (expected http:// or https://): {}",
                target.index,
                target.uri
            );
        }
    }

    Ok(())
}
