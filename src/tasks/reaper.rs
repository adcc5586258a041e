//! Reaper Task
//!
//! Background task that periodically purges expired records from the
//! durable store. It never touches the cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{start_ticker, wait_for_shutdown};
use crate::storage::{RecordRepository, StoreResult};

/// Scans the store once and bulk-deletes every expired record.
///
/// Returns the number of rows the store reported as deleted.
pub async fn reap_expired(repo: &dyn RecordRepository) -> StoreResult<usize> {
    let now = Utc::now();
    let expired_keys: Vec<String> = repo
        .scan_all()
        .await?
        .into_iter()
        .filter(|record| record.is_expired_at(now))
        .map(|record| record.key)
        .collect();

    if expired_keys.is_empty() {
        return Ok(0);
    }

    repo.bulk_delete(&expired_keys).await
}

/// Spawns the reaper loop.
///
/// The first sweep happens one full `interval` after start. A failed sweep
/// is logged and retried on the next tick; the loop only ends when the
/// shutdown flag is raised.
///
/// # Example
/// ```ignore
/// let tasks = BackgroundTasks::new();
/// let handle = spawn_reaper(repo.clone(), Duration::from_secs(600), tasks.subscribe());
/// ```
pub fn spawn_reaper(
    repo: Arc<dyn RecordRepository>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting reaper with interval of {:?}", interval);

        let mut ticker = start_ticker("Reaper", interval).await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match reap_expired(repo.as_ref()).await {
                        Ok(0) => debug!("Reaper: no expired records found"),
                        Ok(removed) => info!("Reaper: removed {} expired records", removed),
                        Err(e) => warn!("Reaper sweep failed, retrying next tick: {}", e),
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        info!("Reaper stopped");
    })
}
