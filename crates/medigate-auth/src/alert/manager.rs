//! Alert manager with per-(user, type) cooldown deduplication.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use medigate_core::config::alert::AlertConfig;
use medigate_core::error::AppError;
use medigate_core::result::AppResult;
use medigate_entity::alert::{AlertSeverity, AlertType, SecurityAlert};

/// Derives and deduplicates security alerts from session events.
///
/// A repeat trigger for the same (user, alert type) pair within the
/// cooldown window is suppressed, not stored. Stored alerts are mutated
/// only by acknowledgment and never deleted.
#[derive(Debug)]
pub struct AlertManager {
    /// Alert id → alert record.
    alerts: DashMap<Uuid, SecurityAlert>,
    /// User id → alert ids, in creation order.
    by_user: DashMap<Uuid, Vec<Uuid>>,
    /// (user id, alert type) → last stored-alert time.
    cooldowns: DashMap<(Uuid, AlertType), DateTime<Utc>>,
    /// Cooldown window.
    cooldown: Duration,
}

impl AlertManager {
    /// Creates a manager from alert configuration.
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            alerts: DashMap::new(),
            by_user: DashMap::new(),
            cooldowns: DashMap::new(),
            cooldown: Duration::minutes(config.cooldown_minutes as i64),
        }
    }

    /// Raises an alert unless the (user, type) pair is within its cooldown.
    ///
    /// Returns the stored alert's id, or `None` when suppressed. The
    /// cooldown timestamp is updated only when an alert is actually stored,
    /// so suppression is idempotent rather than self-extending.
    pub fn raise(
        &self,
        user_id: Uuid,
        alert_type: AlertType,
        severity: AlertSeverity,
        message: &str,
        details: serde_json::Value,
    ) -> Option<Uuid> {
        let now = Utc::now();

        // Check-and-set under the cooldown entry lock so two racing
        // triggers store at most one alert.
        {
            let mut entry = self.cooldowns.entry((user_id, alert_type)).or_insert(
                // Sentinel older than any real cooldown window.
                now - self.cooldown - Duration::seconds(1),
            );
            if now - *entry < self.cooldown {
                debug!(
                    user_id = %user_id,
                    alert_type = %alert_type,
                    "Alert suppressed within cooldown window"
                );
                return None;
            }
            *entry = now;
        }

        let alert = SecurityAlert {
            id: Uuid::new_v4(),
            user_id,
            alert_type,
            severity,
            message: message.to_string(),
            details,
            created_at: now,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        };

        info!(
            user_id = %user_id,
            alert_id = %alert.id,
            alert_type = %alert_type,
            severity = ?severity,
            "Security alert raised"
        );

        let alert_id = alert.id;
        self.by_user.entry(user_id).or_default().push(alert_id);
        self.alerts.insert(alert_id, alert);
        Some(alert_id)
    }

    /// Lists a user's alerts, newest first.
    pub fn list(&self, user_id: Uuid, unacknowledged_only: bool) -> Vec<SecurityAlert> {
        let mut result: Vec<SecurityAlert> = self
            .by_user
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.alerts.get(id).map(|a| a.clone()))
                    .filter(|a| !unacknowledged_only || !a.acknowledged)
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Acknowledges an alert. One-way: re-acknowledging is a conflict.
    pub fn acknowledge(&self, user_id: Uuid, alert_id: Uuid, by: Uuid) -> AppResult<()> {
        let mut entry = self
            .alerts
            .get_mut(&alert_id)
            .ok_or_else(|| AppError::not_found("Alert not found"))?;

        if entry.user_id != user_id {
            return Err(AppError::not_found("Alert not found"));
        }
        if entry.acknowledged {
            return Err(AppError::conflict("Alert is already acknowledged"));
        }

        entry.acknowledged = true;
        entry.acknowledged_by = Some(by);
        entry.acknowledged_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AlertManager {
        AlertManager::new(&AlertConfig::default())
    }

    #[test]
    fn test_raise_stores_alert() {
        let m = manager();
        let user = Uuid::new_v4();
        let id = m.raise(
            user,
            AlertType::NewDevice,
            AlertSeverity::Medium,
            "Login from a new device",
            serde_json::json!({}),
        );
        assert!(id.is_some());
        assert_eq!(m.list(user, false).len(), 1);
    }

    #[test]
    fn test_repeat_within_cooldown_is_suppressed() {
        let m = manager();
        let user = Uuid::new_v4();
        let first = m.raise(
            user,
            AlertType::NewDevice,
            AlertSeverity::Medium,
            "Login from a new device",
            serde_json::json!({}),
        );
        let second = m.raise(
            user,
            AlertType::NewDevice,
            AlertSeverity::Medium,
            "Login from a new device",
            serde_json::json!({}),
        );
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(m.list(user, false).len(), 1);
    }

    #[test]
    fn test_cooldown_is_per_alert_type() {
        let m = manager();
        let user = Uuid::new_v4();
        m.raise(
            user,
            AlertType::NewDevice,
            AlertSeverity::Medium,
            "msg",
            serde_json::json!({}),
        );
        let other = m.raise(
            user,
            AlertType::ConcurrentSessions,
            AlertSeverity::Medium,
            "msg",
            serde_json::json!({}),
        );
        assert!(other.is_some());
        assert_eq!(m.list(user, false).len(), 2);
    }

    #[test]
    fn test_acknowledge_is_one_way() {
        let m = manager();
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let id = m
            .raise(
                user,
                AlertType::SuspiciousLocation,
                AlertSeverity::High,
                "msg",
                serde_json::json!({}),
            )
            .unwrap();

        m.acknowledge(user, id, admin).unwrap();
        let alert = &m.list(user, false)[0];
        assert!(alert.acknowledged);
        assert_eq!(alert.acknowledged_by, Some(admin));
        assert!(alert.acknowledged_at.is_some());

        let err = m.acknowledge(user, id, admin).unwrap_err();
        assert_eq!(err.kind, medigate_core::error::ErrorKind::Conflict);
    }

    #[test]
    fn test_unacknowledged_filter() {
        let m = manager();
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let first = m
            .raise(
                user,
                AlertType::NewDevice,
                AlertSeverity::Medium,
                "msg",
                serde_json::json!({}),
            )
            .unwrap();
        m.raise(
            user,
            AlertType::UnusualActivity,
            AlertSeverity::Low,
            "msg",
            serde_json::json!({}),
        );

        m.acknowledge(user, first, admin).unwrap();
        assert_eq!(m.list(user, true).len(), 1);
        assert_eq!(m.list(user, false).len(), 2);
    }

    #[test]
    fn test_acknowledge_wrong_user_is_not_found() {
        let m = manager();
        let user = Uuid::new_v4();
        let id = m
            .raise(
                user,
                AlertType::NewDevice,
                AlertSeverity::Medium,
                "msg",
                serde_json::json!({}),
            )
            .unwrap();
        let err = m.acknowledge(Uuid::new_v4(), id, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind, medigate_core::error::ErrorKind::NotFound);
    }
}
