//! Periodic expiry sweep for rate counters and IP bans.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use medigate_core::config::rate_limit::RateLimitConfig;

use crate::blacklist::IpBlacklist;
use crate::limiter::RateLimiter;

/// Background sweeper that drops elapsed rate windows and expired bans.
///
/// Both stores also expire entries lazily on access; the sweep bounds
/// memory for keys nothing ever touches again.
pub struct ShieldSweeper {
    limiter: Arc<RateLimiter>,
    blacklist: Arc<IpBlacklist>,
    interval: Duration,
}

impl std::fmt::Debug for ShieldSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShieldSweeper")
            .field("interval", &self.interval)
            .finish()
    }
}

impl ShieldSweeper {
    /// Creates a sweeper over the given stores.
    pub fn new(
        limiter: Arc<RateLimiter>,
        blacklist: Arc<IpBlacklist>,
        config: &RateLimitConfig,
    ) -> Self {
        Self {
            limiter,
            blacklist,
            interval: Duration::from_secs(config.sweep_interval_minutes * 60),
        }
    }

    /// Runs a single sweep pass.
    pub fn run_once(&self) {
        let now = Utc::now();
        let counters = self.limiter.sweep(now);
        let bans = self.blacklist.sweep(now);
        if counters > 0 || bans > 0 {
            info!(counters = counters, bans = bans, "Shield sweep completed");
        } else {
            debug!("Shield sweep completed, nothing to do");
        }
    }

    /// Spawns the sweep loop on the runtime. The loop exits when the
    /// shutdown channel flips to `true`.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Shield sweeper started");
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Shield sweeper received shutdown signal");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                }
            }

            info!("Shield sweeper stopped");
        })
    }
}
