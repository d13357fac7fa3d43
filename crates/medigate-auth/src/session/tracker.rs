//! Session creation orchestration: fingerprinting, risk scoring, cap
//! enforcement, and alert emission.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use medigate_core::config::session::SessionConfig;
use medigate_core::types::AuthIdentity;
use medigate_entity::alert::{AlertSeverity, AlertType};
use medigate_entity::session::Session;

use crate::alert::AlertManager;

use super::fingerprint::{DeviceAttrs, DeviceRegistry};
use super::risk::{RiskScorer, RiskSignals};
use super::store::SessionStore;

/// Client-side metadata for one login.
#[derive(Debug, Clone)]
pub struct LoginContext {
    /// Client IP address.
    pub ip: IpAddr,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Coarse client attributes folded into the device fingerprint.
    pub attrs: DeviceAttrs,
    /// Upstream geolocation heuristic flagged this login location.
    pub unusual_geolocation: bool,
}

impl LoginContext {
    /// Creates a context for a plain browser login.
    pub fn new(ip: IpAddr, user_agent: impl Into<String>) -> Self {
        Self {
            ip,
            user_agent: Some(user_agent.into()),
            attrs: DeviceAttrs::default(),
            unusual_geolocation: false,
        }
    }
}

/// Creates sessions and derives the security signals around them.
///
/// The per-user mutex makes insert + cap enforcement one critical section,
/// so two concurrent logins for the same user cannot both conclude they
/// are under the cap.
pub struct SessionTracker {
    store: Arc<SessionStore>,
    devices: Arc<DeviceRegistry>,
    scorer: RiskScorer,
    alerts: Arc<AlertManager>,
    config: SessionConfig,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionTracker {
    /// Creates a new tracker over the given stores.
    pub fn new(
        store: Arc<SessionStore>,
        devices: Arc<DeviceRegistry>,
        alerts: Arc<AlertManager>,
        config: SessionConfig,
    ) -> Self {
        let scorer = RiskScorer::new(config.risk.clone());
        Self {
            store,
            devices,
            scorer,
            alerts,
            config,
            user_locks: DashMap::new(),
        }
    }

    /// Creates a session for an authenticated login.
    ///
    /// Computes the device fingerprint and risk score, stores the session,
    /// enforces the concurrent-session cap, and emits the resulting
    /// security alerts. Alert emission is best-effort: a suppressed or
    /// failed alert never rolls back the session or an eviction.
    pub async fn create(&self, identity: &AuthIdentity, ctx: &LoginContext) -> Session {
        let user_id = identity.user_id;
        let (fingerprint, is_new_device) =
            self.devices
                .observe(user_id, ctx.user_agent.as_deref(), &ctx.attrs);

        let burst_cutoff =
            Utc::now() - Duration::minutes(self.config.login_burst_window_minutes as i64);
        let login_burst =
            self.store.logins_since(user_id, burst_cutoff) >= self.config.login_burst_threshold;

        let signals = RiskSignals {
            new_device: is_new_device,
            login_burst,
            unusual_geolocation: ctx.unusual_geolocation,
        };
        let risk_score = self
            .scorer
            .score(ctx.ip, ctx.user_agent.as_deref(), signals);

        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        let session = self.store.new_session(
            user_id,
            identity.tenant_id,
            ctx.ip,
            ctx.user_agent.as_deref(),
            fingerprint.device_id.clone(),
            risk_score,
        );
        self.store.insert(session.clone());
        let evicted = self
            .store
            .evict_over_cap(user_id, self.config.max_concurrent_sessions);

        drop(guard);

        info!(
            user_id = %user_id,
            session_id = %session.id,
            risk_score = risk_score,
            new_device = is_new_device,
            "Session created"
        );

        if !evicted.is_empty() {
            self.alerts.raise(
                user_id,
                AlertType::ConcurrentSessions,
                AlertSeverity::Medium,
                "Concurrent session limit exceeded; oldest sessions were signed out",
                serde_json::json!({
                    "cap": self.config.max_concurrent_sessions,
                    "evicted": evicted.iter().map(|s| s.id).collect::<Vec<_>>(),
                }),
            );
        }

        if risk_score > self.scorer.high_risk_threshold() {
            warn!(
                user_id = %user_id,
                session_id = %session.id,
                risk_score = risk_score,
                "High-risk session"
            );
            self.alerts.raise(
                user_id,
                AlertType::SuspiciousLocation,
                AlertSeverity::High,
                "Login from a suspicious location or network",
                serde_json::json!({
                    "session_id": session.id,
                    "ip": ctx.ip.to_string(),
                    "risk_score": risk_score,
                }),
            );
        }

        if is_new_device {
            self.alerts.raise(
                user_id,
                AlertType::NewDevice,
                AlertSeverity::Medium,
                "Login from a new device",
                serde_json::json!({
                    "session_id": session.id,
                    "device_id": fingerprint.device_id,
                }),
            );
        }

        session
    }

    /// Drops per-user lock entries for users with no stored sessions.
    ///
    /// Called from the periodic sweep so the lock map does not grow for
    /// the process lifetime. An entry still held by an in-flight login
    /// (strong count above the map's own reference) is never dropped.
    pub fn prune_locks(&self) -> usize {
        let before = self.user_locks.len();
        self.user_locks.retain(|user_id, lock| {
            Arc::strong_count(lock) > 1 || !self.store.sessions_for_user(*user_id).is_empty()
        });
        before - self.user_locks.len()
    }
}
