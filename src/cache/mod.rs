//! Cache Module
//!
//! Bounded, time-windowed in-memory cache of serialized records.
//!
//! The cache is an accelerator only: every miss falls back to the durable
//! store, so evicting any entry at any time is always safe.

mod entry;
mod stats;
mod store;
mod window;


use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::CacheError;

use entry::CacheEntry;
use window::WindowQueue;

// Re-export public types
pub use stats::CacheStats;
pub use store::CacheStore;

// == Cache Config ==
/// Limits applied by the local cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// How long an entry may stay cached, independent of any record TTL
    pub life_window: Duration,
    /// Maximum number of distinct keys held at once
    pub max_entries_in_window: usize,
    /// Memory ceiling for keys plus payloads, in bytes
    pub hard_max_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            life_window: Duration::from_secs(600),
            max_entries_in_window: 10_000,
            hard_max_bytes: 32 * 1024 * 1024,
        }
    }
}

// == Local Cache ==
/// Thread-safe handle around a [`CacheStore`].
#[derive(Debug)]
pub struct LocalCache {
    store: RwLock<CacheStore>,
}

impl LocalCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(config)),
        }
    }

    /// Looks up a payload. Write lock needed for stats and window expiry.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.write().await.get(key)
    }

    pub async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        self.store.write().await.set(key.to_string(), bytes)
    }

    /// Token to pass to [`LocalCache::fill`], taken before a store read.
    pub async fn fill_token(&self) -> u64 {
        self.store.read().await.fill_token()
    }

    /// Caches a payload read from the store unless a delete ran since
    /// `token` was taken.
    pub async fn fill(&self, key: &str, bytes: Vec<u8>, token: u64) -> Result<bool, CacheError> {
        self.store.write().await.fill(key.to_string(), bytes, token)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn purge_stale(&self) -> usize {
        self.store.write().await.purge_stale()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_cache_round_trip() {
        let cache = LocalCache::new(CacheConfig::default());

        cache.set("a", b"payload".to_vec()).await.unwrap();

        assert_eq!(cache.get("a").await, Some(b"payload".to_vec()));
        assert!(cache.delete("a").await);
        assert_eq!(cache.get("a").await, None);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_local_cache_fill_races_delete() {
        let cache = LocalCache::new(CacheConfig::default());

        let token = cache.fill_token().await;
        cache.delete("a").await;

        assert!(!cache.fill("a", b"old".to_vec(), token).await.unwrap());
        assert_eq!(cache.get("a").await, None);

        let token = cache.fill_token().await;
        assert!(cache.fill("a", b"new".to_vec(), token).await.unwrap());
        assert_eq!(cache.get("a").await, Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_local_cache_shared_across_tasks() {
        let cache = std::sync::Arc::new(LocalCache::new(CacheConfig::default()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set(&format!("k{i}"), vec![i as u8]).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.stats().await.total_entries, 8);
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.life_window, Duration::from_secs(600));
        assert_eq!(config.max_entries_in_window, 10_000);
        assert_eq!(config.hard_max_bytes, 32 * 1024 * 1024);
    }
}
