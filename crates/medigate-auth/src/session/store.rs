//! In-memory session store with deterministic lazy expiry.

use std::collections::VecDeque;
use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use medigate_core::config::session::SessionConfig;
use medigate_entity::session::{ActivityEntry, Session, TerminationReason};

/// Result of one sweep cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// Active sessions deactivated for passing their deadline.
    pub expired: u32,
    /// Old inactive records dropped to bound memory.
    pub dropped: u32,
}

/// Keyed in-memory session state.
///
/// Every read-modify-write runs under the dashmap entry lock for its key,
/// so a request racing the sweep (or another request for the same session)
/// never observes a half-mutated record. A session past its deadline is
/// expired on first read rather than returned as stale "active" state —
/// the outcome is the same whichever path touches it first.
#[derive(Debug)]
pub struct SessionStore {
    /// Session id → session record.
    sessions: DashMap<Uuid, Session>,
    /// User id → session ids (all states, pruned by the sweep).
    by_user: DashMap<Uuid, Vec<Uuid>>,
    /// Session configuration.
    config: SessionConfig,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            by_user: DashMap::new(),
            config,
        }
    }

    /// Builds a new active session record (not yet stored).
    #[allow(clippy::too_many_arguments)]
    pub fn new_session(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        ip_address: IpAddr,
        user_agent: Option<&str>,
        device_id: String,
        risk_score: u8,
    ) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id,
            tenant_id,
            ip_address,
            user_agent: user_agent.map(String::from),
            device_id,
            risk_score,
            activity_log: VecDeque::new(),
            terminated_by: None,
            terminated_reason: None,
            terminated_at: None,
            created_at: now,
            last_activity: now,
            timeout_at: now + self.idle_window(),
        }
    }

    /// Stores a session.
    pub fn insert(&self, session: Session) {
        self.by_user
            .entry(session.user_id)
            .or_default()
            .push(session.id);
        self.sessions.insert(session.id, session);
    }

    /// Returns the session if it is still active, lazily expiring it when
    /// its deadline has passed. Inactive sessions read as absent.
    pub fn get(&self, session_id: Uuid) -> Option<Session> {
        let mut entry = self.sessions.get_mut(&session_id)?;
        if entry.is_terminated() {
            return None;
        }
        if entry.is_expired(Utc::now()) {
            expire_in_place(&mut entry);
            return None;
        }
        Some(entry.clone())
    }

    /// Appends an activity record and extends the idle-timeout deadline.
    ///
    /// Returns `false` when the session is missing, already inactive, or
    /// past its deadline (in which case it is expired in place).
    pub fn touch(&self, session_id: Uuid, action: &str) -> bool {
        let Some(mut entry) = self.sessions.get_mut(&session_id) else {
            return false;
        };
        if entry.is_terminated() {
            return false;
        }
        let now = Utc::now();
        if entry.is_expired(now) {
            expire_in_place(&mut entry);
            return false;
        }

        entry.activity_log.push_back(ActivityEntry {
            at: now,
            action: action.to_string(),
        });
        while entry.activity_log.len() > self.config.activity_log_size {
            entry.activity_log.pop_front();
        }
        entry.last_activity = now;
        entry.timeout_at = now + self.idle_window();
        true
    }

    /// Deactivates a session. Returns `false` if it was already inactive
    /// or does not exist.
    pub fn terminate(
        &self,
        session_id: Uuid,
        reason: TerminationReason,
        by: Option<Uuid>,
    ) -> bool {
        let Some(mut entry) = self.sessions.get_mut(&session_id) else {
            return false;
        };
        if entry.is_terminated() {
            return false;
        }
        entry.terminated_at = Some(Utc::now());
        entry.terminated_reason = Some(reason);
        entry.terminated_by = by;
        debug!(session_id = %session_id, reason = %reason, "Session deactivated");
        true
    }

    /// Deactivates every active session of a user, optionally sparing one.
    /// Returns the number of sessions deactivated.
    pub fn terminate_all(
        &self,
        user_id: Uuid,
        reason: TerminationReason,
        by: Option<Uuid>,
        except: Option<Uuid>,
    ) -> u32 {
        let ids = self.session_ids_for_user(user_id);
        let mut terminated = 0u32;
        for id in ids {
            if Some(id) == except {
                continue;
            }
            if self.terminate(id, reason, by) {
                terminated += 1;
            }
        }
        terminated
    }

    /// Lists the currently active sessions of a user, lazily expiring any
    /// that are overdue.
    pub fn active_for_user(&self, user_id: Uuid) -> Vec<Session> {
        self.session_ids_for_user(user_id)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Counts the currently active sessions of a user.
    pub fn count_active(&self, user_id: Uuid) -> usize {
        self.active_for_user(user_id).len()
    }

    /// Lists all sessions of a user regardless of state (admin surface).
    pub fn sessions_for_user(&self, user_id: Uuid) -> Vec<Session> {
        self.session_ids_for_user(user_id)
            .into_iter()
            .filter_map(|id| self.sessions.get(&id).map(|s| s.clone()))
            .collect()
    }

    /// Counts sessions a user created at or after `cutoff`, in any state.
    pub fn logins_since(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> usize {
        self.session_ids_for_user(user_id)
            .into_iter()
            .filter_map(|id| self.sessions.get(&id))
            .filter(|s| s.created_at >= cutoff)
            .count()
    }

    /// Enforces the concurrent-session cap for a user.
    ///
    /// When the active count exceeds `cap`, deactivates the excess sessions
    /// strictly oldest-by-last-activity first and returns them.
    pub fn evict_over_cap(&self, user_id: Uuid, cap: usize) -> Vec<Session> {
        let mut active = self.active_for_user(user_id);
        if active.len() <= cap {
            return Vec::new();
        }

        active.sort_by_key(|s| s.last_activity);
        let excess = active.len() - cap;
        let mut evicted = Vec::with_capacity(excess);

        for session in active.into_iter().take(excess) {
            if self.terminate(session.id, TerminationReason::Evicted, None) {
                info!(
                    user_id = %user_id,
                    session_id = %session.id,
                    last_activity = %session.last_activity,
                    "Evicted session over concurrent cap"
                );
                evicted.push(session);
            }
        }
        evicted
    }

    /// Runs one sweep cycle at `now`: deadline-expires overdue active
    /// sessions and drops inactive records older than the retention window.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();
        let retention = Duration::hours(self.config.inactive_retention_hours as i64);
        let mut to_drop = Vec::new();

        for mut entry in self.sessions.iter_mut() {
            if entry.is_terminated() {
                if let Some(terminated_at) = entry.terminated_at {
                    if now - terminated_at > retention {
                        to_drop.push((entry.id, entry.user_id));
                    }
                }
            } else if entry.is_expired(now) {
                expire_in_place(&mut entry);
                stats.expired += 1;
            }
        }

        for (id, user_id) in to_drop {
            self.sessions.remove(&id);
            if let Some(mut ids) = self.by_user.get_mut(&user_id) {
                ids.retain(|sid| *sid != id);
            }
            stats.dropped += 1;
        }

        stats
    }

    /// Total number of stored session records (any state).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn idle_window(&self) -> Duration {
        Duration::minutes(self.config.idle_timeout_minutes as i64)
    }

    fn session_ids_for_user(&self, user_id: Uuid) -> Vec<Uuid> {
        self.by_user
            .get(&user_id)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

/// Marks an overdue session inactive with reason `Timeout`, under the
/// caller's entry lock.
fn expire_in_place(session: &mut Session) {
    session.terminated_at = Some(Utc::now());
    session.terminated_reason = Some(TerminationReason::Timeout);
    debug!(session_id = %session.id, "Session expired past idle deadline");
}
