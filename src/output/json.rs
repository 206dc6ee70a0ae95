//! JSON output formatting

use crate::stats::RunSummary;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write the run summary as pretty-printed JSON
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .context("Failed to encode run summary")?;
    Ok(())
}
