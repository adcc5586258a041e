//! Background Tasks Module
//!
//! Periodic tasks owned by the record service.
//!
//! # Tasks
//! - Reaper: bulk-deletes expired records from the durable store
//! - Stats reporter: purges stale cache entries and logs cache statistics

mod reaper;
mod stats_reporter;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::warn;

pub use reaper::{reap_expired, spawn_reaper};
pub use stats_reporter::spawn_stats_reporter;

/// Shortest period a background loop ticks at.
const MIN_TICK: Duration = Duration::from_millis(1);

// == Background Tasks ==
/// Set of cancellable tasks sharing one shutdown signal.
#[derive(Debug)]
pub struct BackgroundTasks {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Returns a receiver that observes the shutdown signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Registers a spawned task to be awaited on shutdown.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// Signals every task to stop and waits for them to finish.
    pub async fn shutdown(&mut self) {
        self.shutdown_tx.send_replace(true);

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        // Tasks still running here were never shut down explicitly.
        self.shutdown_tx.send_replace(true);
    }
}

/// Builds a loop ticker whose first tick is already consumed.
///
/// `tokio::time::interval` panics on a zero period, so shorter periods are
/// raised to [`MIN_TICK`].
pub(crate) async fn start_ticker(task: &str, period: Duration) -> Interval {
    if period < MIN_TICK {
        warn!(
            "{} interval {:?} is too short, using {:?}",
            task, period, MIN_TICK
        );
    }

    let mut ticker = tokio::time::interval(period.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;
    ticker
}

/// Resolves once the shutdown flag is raised or its sender is gone.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
