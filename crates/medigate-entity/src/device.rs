//! Device fingerprint entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A derived identifier for the client device/browser used to detect
/// new-device logins.
///
/// One user may own many fingerprints. A fingerprint counts as new when
/// first observed, or when unseen for longer than the configured
/// staleness window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceFingerprint {
    /// Stable hex digest of user-agent + coarse client attributes.
    pub device_id: String,
    /// The user this fingerprint belongs to.
    pub user_id: Uuid,
    /// When the device was first observed.
    pub first_seen: DateTime<Utc>,
    /// When the device was last observed.
    pub last_seen: DateTime<Utc>,
    /// Whether the user has marked this device as trusted.
    pub trusted: bool,
}

impl DeviceFingerprint {
    /// Check whether the fingerprint has gone unseen longer than `window`.
    pub fn is_stale(&self, window: Duration) -> bool {
        Utc::now() - self.last_seen > window
    }
}
