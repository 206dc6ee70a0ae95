//! fetchpulse - Concurrent HTTP retrieval load generator
//!
//! fetchpulse issues repeated authenticated GETs against a list of target
//! URIs from a pool of concurrent workers, retries rate-limited responses
//! with exponential backoff, and reduces the raw result stream into
//! latency/throughput/error statistics.
//!
//! # Architecture
//!
//! - **Cyclic target queue**: every worker cycles the full target list with
//!   its own cursor
//! - **Pluggable transport**: the HTTP layer is a trait; the core only sees
//!   status code, byte count, and latency
//! - **Bounded retry**: exponential backoff on rate-limit responses
//! - **Append-only result sink**: one JSON line per completed attempt
//! - **Supervised stop**: request-count and wall-clock limits polled by a
//!   single controller loop

pub mod config;
pub mod controller;
pub mod executor;
pub mod output;
pub mod sink;
pub mod stats;
pub mod target;
pub mod transport;
pub mod worker;

// Re-export commonly used types
pub use config::RunConfig;
pub use sink::{AttemptResult, ResultSink};
pub use transport::Transport;

/// Result type used throughout fetchpulse
pub type Result<T> = anyhow::Result<T>;
