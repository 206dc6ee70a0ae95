//! TOML configuration files
//!
//! A run can be described in a TOML file instead of individual CLI flags;
//! missing keys fall back to the same defaults the flags use.

use super::RunConfig;
use crate::Result;
use anyhow::Context;
use std::path::Path;

/// Load a run configuration from a TOML file
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: RunConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
