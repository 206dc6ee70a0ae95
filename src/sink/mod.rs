//! Append-only result log
//!
//! Every completed target visit produces exactly one [`AttemptResult`],
//! appended to a JSON-lines file. Records are completion-ordered, not
//! target-ordered; `target_index` is the only way to map a record back to
//! its target.
//!
//! The sink is the single piece of shared mutable state in a run. Appends go
//! through a mutex-guarded line writer, so concurrent workers never
//! interleave a record, and each append bumps an atomic counter that the
//! stop controller reads without touching the file.

use crate::transport::SUCCESS_STATUS;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, LineWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Outcome of one completed target visit
///
/// A visit may include internal retries but produces exactly one record.
/// Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Last observed HTTP status, or `"000"` when no response was received
    pub http_status: String,
    /// Wall time for the whole visit, including retry backoff, in ms
    pub latency_ms: u64,
    /// Number of retries performed (0 = first attempt was terminal)
    pub retry_count: u32,
    /// Index of the target in the original input list
    pub target_index: usize,
    /// Payload bytes downloaded (0 on failure)
    pub bytes_downloaded: u64,
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        self.http_status == SUCCESS_STATUS
    }
}

/// Durable, append-only record of attempt outcomes
pub struct ResultSink {
    writer: Mutex<LineWriter<File>>,
    completed: AtomicU64,
}

impl ResultSink {
    /// Create (or truncate) the sink file for a new run.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create result sink: {}", path.display()))?;
        Ok(Self {
            writer: Mutex::new(LineWriter::new(file)),
            completed: AtomicU64::new(0),
        })
    }

    /// Append one record as a single line.
    ///
    /// The line writer flushes on the trailing newline, so a record is either
    /// fully visible to readers or not present at all.
    pub fn append(&self, record: &AttemptResult) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to encode attempt result")?;
        {
            let mut writer = self
                .writer
                .lock()
                .map_err(|_| anyhow::anyhow!("Result sink writer poisoned"))?;
            writeln!(writer, "{}", line).context("Failed to append to result sink")?;
        }
        self.completed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of records appended so far.
    ///
    /// This is the live progress signal: read by the stop controller once
    /// per poll interval, never by scanning the file.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Read every complete record currently in a sink file.
///
/// The file may still be appended to; a torn trailing line is skipped rather
/// than treated as corruption.
pub fn read_records(path: &Path) -> Result<Vec<AttemptResult>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open result sink: {}", path.display()))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read result sink")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            // An in-progress append: everything before it is complete.
            Err(_) => break,
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::Arc;

    fn record(target_index: usize, status: &str) -> AttemptResult {
        AttemptResult {
            http_status: status.to_string(),
            latency_ms: 12,
            retry_count: 0,
            target_index,
            bytes_downloaded: if status == "200" { 4096 } else { 0 },
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");

        let sink = ResultSink::create(&path).unwrap();
        sink.append(&record(0, "200")).unwrap();
        sink.append(&record(1, "404")).unwrap();
        sink.append(&record(2, "000")).unwrap();
        assert_eq!(sink.completed(), 3);

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].target_index, 0);
        assert!(records[0].is_success());
        assert!(!records[1].is_success());
        assert_eq!(records[2].http_status, "000");
    }

    #[test]
    fn test_reader_skips_torn_trailing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");

        let sink = ResultSink::create(&path).unwrap();
        sink.append(&record(0, "200")).unwrap();
        drop(sink);

        // Simulate a writer caught mid-append.
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        write!(file, "{{\"http_status\":\"2").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target_index, 0);
    }

    #[test]
    fn test_concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");

        let sink = Arc::new(ResultSink::create(&path).unwrap());
        let mut handles = Vec::new();
        for worker in 0..8 {
            let sink = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    sink.append(&record(worker * 1000 + i, "200")).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.completed(), 400);
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 400);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");

        let sink = ResultSink::create(&path).unwrap();
        sink.append(&record(0, "200")).unwrap();
        drop(sink);

        let sink = ResultSink::create(&path).unwrap();
        assert_eq!(sink.completed(), 0);
        drop(sink);
        assert!(read_records(&path).unwrap().is_empty());
    }
}
