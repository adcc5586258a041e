//! Cache Stats Reporter
//!
//! Periodically drops stale cache entries and logs cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::{start_ticker, wait_for_shutdown};
use crate::cache::LocalCache;

/// Spawns the stats reporter loop.
pub fn spawn_stats_reporter(
    cache: Arc<LocalCache>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = start_ticker("Stats reporter", interval).await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = cache.purge_stale().await;
                    let stats = cache.stats().await;
                    info!(
                        "Cache stats: hits={}, misses={}, evictions={}, expirations={}, entries={}, bytes={}, hit_rate={:.3}, purged={}",
                        stats.hits,
                        stats.misses,
                        stats.evictions,
                        stats.expirations,
                        stats.total_entries,
                        stats.total_bytes,
                        stats.hit_rate(),
                        purged
                    );
                }
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }
    })
}
