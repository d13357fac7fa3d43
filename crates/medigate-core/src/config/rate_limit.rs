//! Rate limiter and abuse detection configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Settings for one named limiter class (e.g. `"login"`, `"api"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterClassConfig {
    /// Size of the counting window in milliseconds.
    pub window_ms: u64,
    /// Maximum number of requests admitted within one window.
    pub max_requests: u32,
    /// Human-readable message returned on denial.
    #[serde(default = "default_denied_message")]
    pub message: String,
    /// Roles that bypass this limiter entirely.
    #[serde(default)]
    pub bypass_roles: Vec<String>,
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Named limiter classes keyed by class name.
    #[serde(default = "default_classes")]
    pub classes: HashMap<String, LimiterClassConfig>,
    /// Extra backoff seconds added per request beyond the limit.
    /// `0` disables the escalating penalty.
    #[serde(default = "default_penalty")]
    pub penalty_per_excess_seconds: u64,
    /// Abuse detector settings.
    #[serde(default)]
    pub abuse: AbuseConfig,
    /// How long an abusive IP stays blacklisted, in minutes.
    #[serde(default = "default_blacklist_duration")]
    pub ip_blacklist_minutes: u64,
    /// Interval for the counter/blacklist expiry sweep in minutes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            penalty_per_excess_seconds: default_penalty(),
            abuse: AbuseConfig::default(),
            ip_blacklist_minutes: default_blacklist_duration(),
            sweep_interval_minutes: default_sweep_interval(),
        }
    }
}

/// Abuse detector configuration.
///
/// Requests matching these signals are rerouted through the strict
/// `"abuse"` limiter class regardless of the endpoint's normal class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseConfig {
    /// User-agent substrings treated as bot-like (case-insensitive).
    #[serde(default = "default_bot_patterns")]
    pub bot_ua_patterns: Vec<String>,
    /// Whether a missing `Accept` header counts as an abuse signal.
    #[serde(default = "default_true")]
    pub flag_missing_accept_header: bool,
    /// Whether a missing user-agent counts as an abuse signal.
    #[serde(default = "default_true")]
    pub flag_missing_user_agent: bool,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            bot_ua_patterns: default_bot_patterns(),
            flag_missing_accept_header: true,
            flag_missing_user_agent: true,
        }
    }
}

fn default_classes() -> HashMap<String, LimiterClassConfig> {
    let mut map = HashMap::new();
    map.insert(
        "login".to_string(),
        LimiterClassConfig {
            window_ms: 60_000,
            max_requests: 5,
            message: "Too many login attempts. Please try again later.".to_string(),
            bypass_roles: Vec::new(),
        },
    );
    map.insert(
        "refresh".to_string(),
        LimiterClassConfig {
            window_ms: 60_000,
            max_requests: 10,
            message: "Too many token refresh attempts.".to_string(),
            bypass_roles: Vec::new(),
        },
    );
    map.insert(
        "api".to_string(),
        LimiterClassConfig {
            window_ms: 60_000,
            max_requests: 120,
            message: "Request rate limit exceeded.".to_string(),
            bypass_roles: vec!["admin".to_string()],
        },
    );
    map.insert(
        "gdpr".to_string(),
        LimiterClassConfig {
            window_ms: 3_600_000,
            max_requests: 10,
            message: "Too many data protection requests.".to_string(),
            bypass_roles: Vec::new(),
        },
    );
    map.insert(
        "abuse".to_string(),
        LimiterClassConfig {
            window_ms: 60_000,
            max_requests: 5,
            message: "Automated traffic detected. Request rate restricted.".to_string(),
            bypass_roles: Vec::new(),
        },
    );
    map
}

fn default_denied_message() -> String {
    "Request rate limit exceeded.".to_string()
}

fn default_penalty() -> u64 {
    60
}

fn default_blacklist_duration() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    5
}

fn default_bot_patterns() -> Vec<String> {
    ["bot", "crawler", "spider", "curl", "python-requests", "scrapy"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}
