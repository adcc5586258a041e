//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with window-ordered eviction.

use std::collections::HashMap;

use crate::cache::{CacheConfig, CacheEntry, CacheStats, WindowQueue};
use crate::error::CacheError;

/// Dead window slots tolerated beyond twice the live entry count.
const COMPACT_SLACK: usize = 64;

enum Slot {
    Fresh,
    Stale,
    Dead,
}

// == Cache Store ==
/// Bounded map from key to serialized bytes.
///
/// Entries live at most `life_window`. When the key cap or the memory
/// ceiling would be exceeded, the oldest insertions are evicted first.
#[derive(Debug)]
pub struct CacheStore {
    /// Key to payload storage
    entries: HashMap<String, CacheEntry>,
    /// Insertion order tracker
    window: WindowQueue,
    /// Performance statistics
    stats: CacheStats,
    /// Limits
    config: CacheConfig,
    /// Memory charged to live entries
    total_bytes: usize,
    /// Bumped by every delete, see [`CacheStore::fill`]
    invalidations: u64,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            window: WindowQueue::new(),
            stats: CacheStats::new(),
            config,
            total_bytes: 0,
            invalidations: 0,
        }
    }

    // == Get ==
    /// Retrieves the payload for `key`.
    ///
    /// Entries past the life window are dropped and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_stale(self.config.life_window) {
            self.remove_entry(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            self.sync_occupancy();
            return None;
        }

        let bytes = entry.bytes.clone();
        self.stats.record_hit();
        Some(bytes)
    }

    // == Set ==
    /// Stores a payload, replacing any previous one for the same key.
    ///
    /// Evicts the oldest entries until the new one fits under both the key
    /// cap and the memory ceiling.
    pub fn set(&mut self, key: String, bytes: Vec<u8>) -> Result<(), CacheError> {
        let size = key.len() + bytes.len();
        if size > self.config.hard_max_bytes {
            return Err(CacheError::EntryTooLarge {
                key,
                size,
                max: self.config.hard_max_bytes,
            });
        }

        self.remove_entry(&key);
        self.purge_stale_entries();

        while !self.entries.is_empty()
            && (self.entries.len() >= self.config.max_entries_in_window
                || self.total_bytes + size > self.config.hard_max_bytes)
        {
            if !self.evict_oldest() {
                break;
            }
        }

        let seq = self.window.push(&key);
        self.total_bytes += size;
        self.entries.insert(key, CacheEntry::new(bytes, seq));

        self.compact_if_needed();
        self.sync_occupancy();
        Ok(())
    }

    // == Fill ==
    /// Returns the token to hand to [`CacheStore::fill`] before reading the
    /// value from the backing store.
    pub fn fill_token(&self) -> u64 {
        self.invalidations
    }

    /// Stores a payload read from the backing store, unless a delete ran
    /// since `token` was taken. Returns whether the payload was stored.
    ///
    /// A delete in between may stand for a write the payload predates.
    pub fn fill(&mut self, key: String, bytes: Vec<u8>, token: u64) -> Result<bool, CacheError> {
        if token != self.invalidations {
            return Ok(false);
        }
        self.set(key, bytes).map(|()| true)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was present.
    ///
    /// Invalidates outstanding fill tokens even when the key was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        self.invalidations = self.invalidations.wrapping_add(1);
        let removed = self.remove_entry(key);
        self.compact_if_needed();
        self.sync_occupancy();
        removed
    }

    // == Purge Stale ==
    /// Drops every entry that outlived the life window.
    ///
    /// Returns the number of entries removed.
    pub fn purge_stale(&mut self) -> usize {
        let removed = self.purge_stale_entries();
        self.compact_if_needed();
        self.sync_occupancy();
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.total_bytes);
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Memory currently charged to entries, in bytes.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    // == Internals ==
    fn remove_entry(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_bytes -= entry.size(key);
                true
            }
            None => false,
        }
    }

    /// Slots are in insertion order, so stale entries sit at the front.
    fn purge_stale_entries(&mut self) -> usize {
        let mut removed = 0;

        loop {
            let slot = match self.window.peek_oldest() {
                None => break,
                Some((key, seq)) => match self.entries.get(key) {
                    Some(entry) if entry.seq == seq => {
                        if entry.is_stale(self.config.life_window) {
                            Slot::Stale
                        } else {
                            Slot::Fresh
                        }
                    }
                    _ => Slot::Dead,
                },
            };

            match slot {
                Slot::Fresh => break,
                Slot::Dead => {
                    self.window.pop_oldest();
                }
                Slot::Stale => {
                    if let Some((key, _)) = self.window.pop_oldest() {
                        self.remove_entry(&key);
                        self.stats.record_expiration();
                        removed += 1;
                    }
                }
            }
        }

        removed
    }

    /// Evicts the oldest live entry. Returns false if nothing was left.
    fn evict_oldest(&mut self) -> bool {
        while let Some((key, seq)) = self.window.pop_oldest() {
            let live = self.entries.get(&key).is_some_and(|e| e.seq == seq);
            if live {
                self.remove_entry(&key);
                self.stats.record_eviction();
                return true;
            }
        }
        false
    }

    fn compact_if_needed(&mut self) {
        if self.window.len() > self.entries.len() * 2 + COMPACT_SLACK {
            let entries = &self.entries;
            self.window
                .compact(|key, seq| entries.get(key).is_some_and(|e| e.seq == seq));
        }
    }

    fn sync_occupancy(&mut self) {
        self.stats.set_occupancy(self.entries.len(), self.total_bytes);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn config(max_entries: usize, hard_max_bytes: usize) -> CacheConfig {
        CacheConfig {
            life_window: Duration::from_secs(300),
            max_entries_in_window: max_entries,
            hard_max_bytes,
        }
    }

    fn store() -> CacheStore {
        CacheStore::new(config(100, 1024 * 1024))
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1".to_string(), b"value1".to_vec()).unwrap();

        assert_eq!(store.get("key1"), Some(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 10);
    }

    #[test]
    fn test_fill_with_current_token() {
        let mut store = store();

        let token = store.fill_token();
        assert!(store.fill("key1".to_string(), b"v".to_vec(), token).unwrap());

        assert_eq!(store.get("key1"), Some(b"v".to_vec()));
    }

    #[test]
    fn test_fill_after_delete_is_skipped() {
        let mut store = store();

        let token = store.fill_token();
        // Deleting an absent key still invalidates the token
        assert!(!store.delete("key1"));

        assert!(!store.fill("key1".to_string(), b"old".to_vec(), token).unwrap());
        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();
        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let mut store = store();

        store.set("key1".to_string(), b"value1".to_vec()).unwrap();

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn test_store_overwrite_replaces_bytes() {
        let mut store = store();

        store.set("key1".to_string(), b"value1".to_vec()).unwrap();
        store.set("key1".to_string(), b"v2".to_vec()).unwrap();

        assert_eq!(store.get("key1"), Some(b"v2".to_vec()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 6);
    }

    #[test]
    fn test_store_life_window_expiration() {
        let mut store = CacheStore::new(CacheConfig {
            life_window: Duration::from_millis(20),
            ..config(100, 1024)
        });

        store.set("key1".to_string(), b"v".to_vec()).unwrap();
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(40));

        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_key_cap_evicts_oldest_insertion() {
        let mut store = CacheStore::new(config(3, 1024));

        store.set("key1".to_string(), b"v".to_vec()).unwrap();
        store.set("key2".to_string(), b"v".to_vec()).unwrap();
        store.set("key3".to_string(), b"v".to_vec()).unwrap();

        // Reads do not refresh insertion order
        store.get("key1");

        store.set("key4".to_string(), b"v".to_vec()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_overwrite_moves_key_to_newest() {
        let mut store = CacheStore::new(config(2, 1024));

        store.set("a".to_string(), b"v".to_vec()).unwrap();
        store.set("b".to_string(), b"v".to_vec()).unwrap();
        store.set("a".to_string(), b"v2".to_vec()).unwrap();
        store.set("c".to_string(), b"v".to_vec()).unwrap();

        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some(b"v2".to_vec()));
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_store_memory_ceiling_evicts_until_fit() {
        // Each entry charges 1 + 10 = 11 bytes
        let mut store = CacheStore::new(config(100, 30));

        store.set("a".to_string(), vec![0; 10]).unwrap();
        store.set("b".to_string(), vec![0; 10]).unwrap();
        store.set("c".to_string(), vec![0; 10]).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.total_bytes() <= 30);
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_store_rejects_entry_above_ceiling() {
        let mut store = CacheStore::new(config(100, 8));

        let result = store.set("key".to_string(), vec![0; 16]);

        assert!(matches!(result, Err(CacheError::EntryTooLarge { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_purge_stale() {
        let mut store = CacheStore::new(CacheConfig {
            life_window: Duration::from_millis(20),
            ..config(100, 1024)
        });

        store.set("old".to_string(), b"v".to_vec()).unwrap();
        sleep(Duration::from_millis(40));
        store.set("new".to_string(), b"v".to_vec()).unwrap();

        // "old" was already purged by the second set
        assert_eq!(store.len(), 1);
        assert_eq!(store.purge_stale(), 0);
        assert!(store.get("new").is_some());
    }

    #[test]
    fn test_store_dead_slots_are_compacted() {
        let mut store = store();

        for _ in 0..(COMPACT_SLACK * 4) {
            store.set("same".to_string(), b"v".to_vec()).unwrap();
        }

        assert_eq!(store.len(), 1);
        assert!(store.window.len() <= 2 + COMPACT_SLACK + 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store();

        store.set("key1".to_string(), b"value1".to_vec()).unwrap();
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 10);
    }
}
