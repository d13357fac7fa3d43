//! Security alert entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categories of security alerts derived from session events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Login from a never-before-seen or stale device fingerprint.
    NewDevice,
    /// High-risk session (suspicious location/network signals).
    SuspiciousLocation,
    /// Concurrent-session cap exceeded and sessions evicted.
    ConcurrentSessions,
    /// Anomalous activity pattern within a session.
    UnusualActivity,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewDevice => write!(f, "NEW_DEVICE"),
            Self::SuspiciousLocation => write!(f, "SUSPICIOUS_LOCATION"),
            Self::ConcurrentSessions => write!(f, "CONCURRENT_SESSIONS"),
            Self::UnusualActivity => write!(f, "UNUSUAL_ACTIVITY"),
        }
    }
}

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A stored security alert.
///
/// Created only by the alert manager in response to session events;
/// mutated only by acknowledgment; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAlert {
    /// Unique alert identifier.
    pub id: Uuid,
    /// The user the alert concerns.
    pub user_id: Uuid,
    /// Alert category.
    pub alert_type: AlertType,
    /// Severity level.
    pub severity: AlertSeverity,
    /// Human-readable summary.
    pub message: String,
    /// Structured detail payload (session id, device id, counts, ...).
    pub details: serde_json::Value,
    /// When the alert was created.
    pub created_at: DateTime<Utc>,
    /// Whether the alert has been acknowledged.
    pub acknowledged: bool,
    /// Who acknowledged the alert.
    pub acknowledged_by: Option<Uuid>,
    /// When the alert was acknowledged.
    pub acknowledged_at: Option<DateTime<Utc>>,
}
