//! Session entity model.

use std::collections::VecDeque;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One authenticated login.
///
/// Sessions are created on login and soft-deactivated on logout, idle
/// timeout, admin termination, or eviction under the concurrent-session
/// cap. A deactivated session is terminal; a new login always creates a
/// new session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// The practice tenant of the owning user.
    pub tenant_id: Uuid,
    /// IP address from which the session was created.
    pub ip_address: IpAddr,
    /// User-Agent header value at login.
    pub user_agent: Option<String>,
    /// Device fingerprint id (hex digest) this session was created from.
    pub device_id: String,
    /// Heuristic risk score, 0–100.
    pub risk_score: u8,
    /// Most recent activity entries, oldest evicted first.
    pub activity_log: VecDeque<ActivityEntry>,

    // -- Termination --
    /// The admin who terminated this session (if applicable).
    pub terminated_by: Option<Uuid>,
    /// Why the session ended.
    pub terminated_reason: Option<TerminationReason>,
    /// When the session was deactivated.
    pub terminated_at: Option<DateTime<Utc>>,

    // -- Timestamps --
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp.
    pub last_activity: DateTime<Utc>,
    /// Idle-timeout deadline, recomputed on every activity.
    pub timeout_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is active (not terminated and not past
    /// its idle-timeout deadline).
    pub fn is_active(&self) -> bool {
        self.terminated_at.is_none() && self.timeout_at > Utc::now()
    }

    /// Check whether the idle-timeout deadline has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.timeout_at <= now
    }

    /// Check whether the session has been deactivated.
    pub fn is_terminated(&self) -> bool {
        self.terminated_at.is_some()
    }

    /// Calculate how long the session has been idle (in seconds).
    pub fn idle_seconds(&self) -> i64 {
        (Utc::now() - self.last_activity).num_seconds().max(0)
    }
}

/// One entry in a session's bounded activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// When the activity happened.
    pub at: DateTime<Utc>,
    /// What the activity was (e.g. `"api_request"`, `"token_refresh"`).
    pub action: String,
}

/// Why a session was deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Explicit user logout.
    Logout,
    /// Terminated by an administrator.
    AdminTermination,
    /// Idle-timeout deadline passed.
    Timeout,
    /// Evicted under the concurrent-session cap.
    Evicted,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logout => write!(f, "logout"),
            Self::AdminTermination => write!(f, "admin_termination"),
            Self::Timeout => write!(f, "timeout"),
            Self::Evicted => write!(f, "evicted"),
        }
    }
}
