//! Background task that drops expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::cache::Cache;

/// Periodically calls [`Cache::purge_expired`] on a shared cache.
///
/// Runs as a tokio task and stops on `shutdown()` or when dropped, so
/// it must be started from within a runtime.
pub struct CachePurgeDaemon {
    handle: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl CachePurgeDaemon {
    /// Spawns the purge loop. The first purge happens one `interval` after start.
    pub fn start(cache: Arc<dyn Cache>, interval: Duration) -> Self {
        let (shutdown, signal) = watch::channel(false);
        let handle = tokio::spawn(Self::run_loop(cache, interval, signal));

        info!(interval_secs = interval.as_secs(), "Cache purge daemon started");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    async fn run_loop(cache: Arc<dyn Cache>, interval: Duration, mut signal: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match cache.purge_expired().await {
                        Ok(0) => debug!("No expired cache entries"),
                        Ok(purged) => info!(purged, "Purged expired cache entries"),
                        Err(e) => warn!(error = %e, "Cache purge failed"),
                    }
                }
                changed = signal.changed() => {
                    if changed.is_err() || *signal.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Cache purge daemon stopped");
    }

    /// Signals the loop to stop; it exits at its next await point
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Waits for the loop to finish after `shutdown()`
    pub async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Cache purge daemon task failed: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CachePurgeDaemon {
    fn drop(&mut self) {
        self.shutdown();

        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
