//! Periodic session maintenance task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use medigate_core::config::session::SessionConfig;

use super::store::SessionStore;
use super::tracker::SessionTracker;

/// Background sweeper that expires idle sessions, drops terminated ones
/// past their retention window, and prunes the tracker's per-user locks.
///
/// Expiry also happens lazily on every store read; the sweep only exists
/// so sessions nobody touches again still transition and get dropped.
pub struct SessionSweeper {
    /// Store to sweep.
    store: Arc<SessionStore>,
    /// Tracker whose lock map is pruned alongside.
    tracker: Arc<SessionTracker>,
    /// Time between sweeps.
    interval: Duration,
}

impl std::fmt::Debug for SessionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSweeper")
            .field("interval", &self.interval)
            .finish()
    }
}

impl SessionSweeper {
    /// Creates a sweeper over the given store and tracker.
    pub fn new(
        store: Arc<SessionStore>,
        tracker: Arc<SessionTracker>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            store,
            tracker,
            interval: Duration::from_secs(config.sweep_interval_minutes * 60),
        }
    }

    /// Runs a single sweep pass.
    pub fn run_once(&self) {
        let stats = self.store.sweep(Utc::now());
        let locks = self.tracker.prune_locks();
        if stats.expired > 0 || stats.dropped > 0 || locks > 0 {
            info!(
                expired = stats.expired,
                dropped = stats.dropped,
                locks = locks,
                "Session sweep completed"
            );
        } else {
            debug!("Session sweep completed, nothing to do");
        }
    }

    /// Spawns the sweep loop on the runtime. The loop exits when the
    /// shutdown channel flips to `true`.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Session sweeper started");
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            // First tick fires immediately; consume it so the initial
            // sweep does not race session creation at startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Session sweeper received shutdown signal");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                }
            }

            info!("Session sweeper stopped");
        })
    }
}
