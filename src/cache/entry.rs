//! Cache Entry Module
//!
//! Defines a single cached payload and its window bookkeeping.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A serialized payload held by the cache.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// Serialized payload
    pub bytes: Vec<u8>,
    /// When the entry entered the cache
    pub inserted_at: Instant,
    /// Insertion sequence number, matches the entry's slot in the window queue
    pub seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(bytes: Vec<u8>, seq: u64) -> Self {
        Self {
            bytes,
            inserted_at: Instant::now(),
            seq,
        }
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived the cache's life window.
    ///
    /// Boundary condition: an entry is stale once the full window has elapsed,
    /// so a zero window makes every entry stale immediately.
    pub fn is_stale(&self, life_window: Duration) -> bool {
        self.inserted_at.elapsed() >= life_window
    }

    // == Size ==
    /// Memory charged for this entry under `key`.
    pub fn size(&self, key: &str) -> usize {
        key.len() + self.bytes.len()
    }
}
