//! Session lifecycle and risk scoring configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle timeout in minutes before a session is considered inactive.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Maximum concurrent active sessions per user. The oldest sessions
    /// (by last activity) are evicted when a new login exceeds this.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sessions: usize,
    /// Interval for the expired-session sweep in minutes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
    /// How long soft-deactivated sessions are retained before the sweep
    /// drops them, in hours.
    #[serde(default = "default_inactive_retention")]
    pub inactive_retention_hours: u64,
    /// Maximum number of activity entries retained per session.
    #[serde(default = "default_activity_log_size")]
    pub activity_log_size: usize,
    /// Window for the login-burst risk signal, in minutes.
    #[serde(default = "default_burst_window")]
    pub login_burst_window_minutes: u64,
    /// Number of logins within the burst window that counts as a burst.
    #[serde(default = "default_burst_threshold")]
    pub login_burst_threshold: usize,
    /// Days after which an unseen device fingerprint counts as new again.
    #[serde(default = "default_fingerprint_staleness")]
    pub fingerprint_staleness_days: u64,
    /// Risk scoring weights and thresholds.
    #[serde(default)]
    pub risk: RiskConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            max_concurrent_sessions: default_max_concurrent(),
            sweep_interval_minutes: default_sweep_interval(),
            inactive_retention_hours: default_inactive_retention(),
            activity_log_size: default_activity_log_size(),
            login_burst_window_minutes: default_burst_window(),
            login_burst_threshold: default_burst_threshold(),
            fingerprint_staleness_days: default_fingerprint_staleness(),
            risk: RiskConfig::default(),
        }
    }
}

/// Heuristic risk-scoring weights.
///
/// These are operational tuning knobs carried over from the original
/// deployment; they are configuration, not derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Weight added when the device fingerprint is new.
    #[serde(default = "default_weight_new_device")]
    pub new_device: u8,
    /// Weight added when the user-agent matches a suspicious pattern.
    #[serde(default = "default_weight_suspicious_ua")]
    pub suspicious_user_agent: u8,
    /// Weight added when the client IP matches a suspicious pattern.
    #[serde(default = "default_weight_suspicious_ip")]
    pub suspicious_ip: u8,
    /// Weight added for an unusual geolocation signal.
    #[serde(default = "default_weight_unusual_geo")]
    pub unusual_geolocation: u8,
    /// Weight added when the user created a burst of recent logins.
    #[serde(default = "default_weight_login_burst")]
    pub login_burst: u8,
    /// Score above which a session is considered high risk.
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: u8,
    /// User-agent substrings treated as suspicious (case-insensitive).
    #[serde(default = "default_suspicious_ua_patterns")]
    pub suspicious_ua_patterns: Vec<String>,
    /// IP prefixes treated as suspicious.
    #[serde(default)]
    pub suspicious_ip_prefixes: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            new_device: default_weight_new_device(),
            suspicious_user_agent: default_weight_suspicious_ua(),
            suspicious_ip: default_weight_suspicious_ip(),
            unusual_geolocation: default_weight_unusual_geo(),
            login_burst: default_weight_login_burst(),
            high_risk_threshold: default_high_risk_threshold(),
            suspicious_ua_patterns: default_suspicious_ua_patterns(),
            suspicious_ip_prefixes: Vec::new(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    5
}

fn default_sweep_interval() -> u64 {
    5
}

fn default_inactive_retention() -> u64 {
    24
}

fn default_activity_log_size() -> usize {
    50
}

fn default_burst_window() -> u64 {
    60
}

fn default_burst_threshold() -> usize {
    3
}

fn default_fingerprint_staleness() -> u64 {
    90
}

fn default_weight_new_device() -> u8 {
    30
}

fn default_weight_suspicious_ua() -> u8 {
    20
}

fn default_weight_suspicious_ip() -> u8 {
    25
}

fn default_weight_unusual_geo() -> u8 {
    15
}

fn default_weight_login_burst() -> u8 {
    10
}

fn default_high_risk_threshold() -> u8 {
    70
}

fn default_suspicious_ua_patterns() -> Vec<String> {
    ["curl", "python-requests", "scrapy", "headless"]
        .into_iter()
        .map(String::from)
        .collect()
}
