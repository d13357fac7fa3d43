//! Device fingerprint registry.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use medigate_core::error::AppError;
use medigate_core::result::AppResult;
use medigate_entity::device::DeviceFingerprint;

/// Coarse client attributes folded into the device id alongside the
/// user-agent string.
#[derive(Debug, Clone, Default)]
pub struct DeviceAttrs {
    /// Client platform (e.g. `"Windows"`, `"iOS"`).
    pub platform: Option<String>,
    /// Screen resolution string.
    pub screen: Option<String>,
    /// Client timezone name.
    pub timezone: Option<String>,
}

/// Tracks the device fingerprints each user has logged in from.
///
/// A fingerprint counts as new when first observed, or when it has gone
/// unseen longer than the staleness window.
#[derive(Debug)]
pub struct DeviceRegistry {
    /// (user id, device id) → fingerprint record.
    devices: DashMap<(Uuid, String), DeviceFingerprint>,
    /// Window after which an unseen fingerprint counts as new again.
    staleness: Duration,
}

impl DeviceRegistry {
    /// Creates a registry with the given staleness window.
    pub fn new(staleness_days: u64) -> Self {
        Self {
            devices: DashMap::new(),
            staleness: Duration::days(staleness_days as i64),
        }
    }

    /// Computes the stable device id for a user-agent + attribute set.
    pub fn device_id(user_agent: Option<&str>, attrs: &DeviceAttrs) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_agent.unwrap_or("unknown").as_bytes());
        hasher.update(b"|");
        hasher.update(attrs.platform.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(attrs.screen.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(attrs.timezone.as_deref().unwrap_or("").as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Records an observation of a device for a user.
    ///
    /// Returns the fingerprint record and whether it counts as new
    /// (never seen, or stale). The last-seen timestamp is bumped either way.
    pub fn observe(
        &self,
        user_id: Uuid,
        user_agent: Option<&str>,
        attrs: &DeviceAttrs,
    ) -> (DeviceFingerprint, bool) {
        let device_id = Self::device_id(user_agent, attrs);
        let now = Utc::now();

        let mut entry = self
            .devices
            .entry((user_id, device_id.clone()))
            .or_insert_with(|| {
                debug!(user_id = %user_id, device_id = %device_id, "First sighting of device");
                DeviceFingerprint {
                    device_id: device_id.clone(),
                    user_id,
                    first_seen: now,
                    last_seen: now,
                    trusted: false,
                }
            });

        let is_new = entry.first_seen == now || entry.is_stale(self.staleness);
        entry.last_seen = now;

        (entry.clone(), is_new)
    }

    /// Marks a device as trusted by its owner.
    pub fn trust(&self, user_id: Uuid, device_id: &str) -> AppResult<()> {
        let mut entry = self
            .devices
            .get_mut(&(user_id, device_id.to_string()))
            .ok_or_else(|| AppError::not_found("Device fingerprint not found"))?;
        entry.trusted = true;
        Ok(())
    }

    /// Lists all fingerprints recorded for a user.
    pub fn devices_for_user(&self, user_id: Uuid) -> Vec<DeviceFingerprint> {
        self.devices
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
