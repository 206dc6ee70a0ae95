//! Target list management
//!
//! A run operates over a fixed list of target URIs. Each target is assigned a
//! stable index at load time so that results can always be attributed to the
//! original input ordering, even when the queue is shuffled before the run.
//!
//! The queue is logically infinite: `get(cursor)` wraps around the list, and
//! every worker walks it with its own private cursor starting at zero.
//! Workers are deliberately not partitioned across the list - all workers
//! visit index 0 first, then index 1, and so on, producing a correlated
//! burst at the start of the run that only latency jitter desynchronizes.
//! This synchronized load shape is part of the tool's contract.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One addressable resource to request repeatedly during a run
///
/// The index is assigned in input order at load time and never changes,
/// including across a shuffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub index: usize,
    pub uri: String,
}

/// Immutable, cyclically indexed list of targets
///
/// Shared read-only across all workers; cursor arithmetic is pure, so no
/// locking is needed for concurrent reads.
#[derive(Debug, Clone)]
pub struct TargetQueue {
    targets: Vec<Target>,
}

impl TargetQueue {
    /// Build a queue from raw URIs, assigning stable indices in input order.
    pub fn load<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = raw
            .into_iter()
            .enumerate()
            .map(|(index, uri)| Target {
                index,
                uri: uri.into(),
            })
            .collect();
        Self { targets }
    }

    /// Apply the run ordering: either the original input order, or a single
    /// pre-run random permutation. The `(index, uri)` pairing is preserved
    /// either way.
    pub fn materialize(mut self, randomize: bool) -> Self {
        if randomize {
            self.targets.shuffle(&mut rand::thread_rng());
        }
        self
    }

    /// Target at the given cursor position, wrapping around the list.
    ///
    /// The queue must be non-empty; an empty target list is rejected by
    /// config validation before any worker starts.
    pub fn get(&self, cursor: u64) -> &Target {
        let n = self.targets.len() as u64;
        &self.targets[(cursor % n) as usize]
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}
