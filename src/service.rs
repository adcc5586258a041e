//! Record Lifecycle Service
//!
//! Orchestrates reads and writes across the local cache and the durable
//! store, enforces expiration, and owns the background tasks.
//!
//! # Read path
//! Cache first; on a miss the store is consulted and a valid record is
//! written back to the cache. Expired records are never returned: the read
//! fails with [`RecordError::Expired`] and the key is deleted from the store
//! in a detached task.
//!
//! # Write path
//! Writes go to the store only. The cache entry of the written key is
//! dropped afterwards so the next read repopulates it from committed data.
//! A read that loaded the row before that drop does not cache its copy.
//!
//! # Concurrency
//! [`RecordService::set_ttl`] is a read-modify-write without isolation: a
//! concurrent `set` or `set_ttl` on the same key may interleave and the last
//! write reaching the store wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, CacheStats, LocalCache};
use crate::error::{RecordError, Result};
use crate::record::{expire_at_from_ttl, Record};
use crate::storage::RecordRepository;
use crate::tasks::{reap_expired, spawn_reaper, spawn_stats_reporter, BackgroundTasks};

// == Service Settings ==
/// Construction parameters for [`RecordService`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    /// Interval between reaper sweeps
    pub reaper_interval: Duration,
    /// Interval between cache stats reports
    pub stats_interval: Duration,
    /// Cache limits, None disables the cache
    pub cache: Option<CacheConfig>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            reaper_interval: Duration::from_secs(600),
            stats_interval: Duration::from_secs(3600),
            cache: Some(CacheConfig::default()),
        }
    }
}

// == Record Service ==
pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
    cache: Option<Arc<LocalCache>>,
    tasks: Mutex<BackgroundTasks>,
}

impl RecordService {
    // == Constructor ==
    /// Creates the service and starts its background tasks.
    ///
    /// Must be called from within a Tokio runtime. Call
    /// [`RecordService::shutdown`] to stop the tasks.
    pub fn new(repo: Arc<dyn RecordRepository>, settings: ServiceSettings) -> Self {
        let cache = settings.cache.map(|config| Arc::new(LocalCache::new(config)));

        let mut tasks = BackgroundTasks::new();
        tasks.track(spawn_reaper(
            Arc::clone(&repo),
            settings.reaper_interval,
            tasks.subscribe(),
        ));
        if let Some(cache) = &cache {
            tasks.track(spawn_stats_reporter(
                Arc::clone(cache),
                settings.stats_interval,
                tasks.subscribe(),
            ));
        }

        info!(
            "Record service started (cache {})",
            if cache.is_some() { "enabled" } else { "disabled" }
        );

        Self {
            repo,
            cache,
            tasks: Mutex::new(tasks),
        }
    }

    // == Set ==
    /// Creates or fully replaces a record.
    ///
    /// `ttl == 0` stores a permanent record. Store errors are returned as is.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: TimeDelta,
    ) -> Result<()> {
        let record = Record::new(key, value, ttl)?;

        self.repo.upsert(&record).await?;
        self.cache_invalidate(&record.key).await;
        Ok(())
    }

    // == Get ==
    /// Returns the record for `key` if present and not expired.
    pub async fn get(&self, key: &str) -> Result<Record> {
        validate_key(key)?;

        if let Some(record) = self.cache_get(key).await {
            return Ok(record);
        }

        let fill_token = self.cache_fill_token().await;
        let record = self
            .repo
            .get(key)
            .await?
            .ok_or_else(|| RecordError::NotFound(key.to_string()))?;

        if record.is_expired() {
            self.spawn_cleanup(vec![record.key]);
            return Err(RecordError::Expired(key.to_string()));
        }

        self.cache_fill(&record, fill_token).await;
        Ok(record)
    }

    // == Get All ==
    /// Returns every non-expired record in store order.
    ///
    /// Expired records found by the scan are deleted in one detached bulk
    /// delete.
    pub async fn get_all(&self) -> Result<Vec<Record>> {
        let records = self.repo.scan_all().await?;
        let (live, expired_keys) = partition_expired(records, Utc::now());

        if !expired_keys.is_empty() {
            self.spawn_cleanup(expired_keys);
        }

        Ok(live)
    }

    // == Set TTL ==
    /// Replaces only the TTL of an existing record and returns the result.
    pub async fn set_ttl(&self, key: &str, ttl: TimeDelta) -> Result<Record> {
        validate_key(key)?;
        expire_at_from_ttl(ttl, Utc::now())?;

        let mut record = self
            .repo
            .get(key)
            .await?
            .ok_or_else(|| RecordError::NotFound(key.to_string()))?;

        let now = Utc::now();
        if record.is_expired_at(now) {
            self.spawn_cleanup(vec![record.key]);
            return Err(RecordError::Expired(key.to_string()));
        }

        record.apply_ttl(ttl, now)?;
        self.repo.upsert(&record).await?;
        self.cache_invalidate(key).await;

        Ok(record)
    }

    // == Maintenance ==
    /// Runs one reaper sweep immediately.
    pub async fn reap_expired(&self) -> Result<usize> {
        Ok(reap_expired(self.repo.as_ref()).await?)
    }

    /// Returns cache statistics, or None when the cache is disabled.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => Some(cache.stats().await),
            None => None,
        }
    }

    /// Stops the background tasks and waits for them to finish.
    ///
    /// Detached cleanup deletes are not affected.
    pub async fn shutdown(&self) {
        self.tasks.lock().await.shutdown().await;
        info!("Record service stopped");
    }

    // == Cache Integration ==
    async fn cache_get(&self, key: &str) -> Option<Record> {
        let cache = self.cache.as_ref()?;
        let bytes = cache.get(key).await?;

        let record: Record = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!("Dropping undecodable cache entry for '{}': {}", key, e);
                cache.delete(key).await;
                return None;
            }
        };

        if record.is_expired() {
            cache.delete(key).await;
            return None;
        }

        Some(record)
    }

    async fn cache_fill_token(&self) -> Option<u64> {
        match &self.cache {
            Some(cache) => Some(cache.fill_token().await),
            None => None,
        }
    }

    async fn cache_fill(&self, record: &Record, token: Option<u64>) {
        let (Some(cache), Some(token)) = (&self.cache, token) else {
            return;
        };

        let result = match serde_json::to_vec(record) {
            Ok(bytes) => cache.fill(&record.key, bytes, token).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(true) => {}
            Ok(false) => debug!("Record '{}' changed during read, not cached", record.key),
            Err(e) => debug!("Record '{}' not cached: {}", record.key, e),
        }
    }

    async fn cache_invalidate(&self, key: &str) {
        if let Some(cache) = &self.cache {
            cache.delete(key).await;
        }
    }

    /// Deletes `keys` in a detached task; the outcome is only logged.
    fn spawn_cleanup(&self, keys: Vec<String>) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            match repo.bulk_delete(&keys).await {
                Ok(removed) => debug!(
                    "Cleanup removed {} of {} expired records",
                    removed,
                    keys.len()
                ),
                Err(e) => warn!("Cleanup of {} expired records failed: {}", keys.len(), e),
            }
        });
    }
}

// == Utility Functions ==
/// Splits records into live ones (order kept) and the keys of expired ones.
pub fn partition_expired(records: Vec<Record>, now: DateTime<Utc>) -> (Vec<Record>, Vec<String>) {
    let mut live = Vec::with_capacity(records.len());
    let mut expired_keys = Vec::new();

    for record in records {
        if record.is_expired_at(now) {
            expired_keys.push(record.key);
        } else {
            live.push(record);
        }
    }

    (live, expired_keys)
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RecordError::Validation("Key cannot be empty".to_string()));
    }
    Ok(())
}
