//! Keyed fixed-window rate limiting with escalating penalties.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use medigate_core::config::rate_limit::RateLimitConfig;

/// Outcome of one admission check, exposed to callers as response
/// metadata (limit, remaining, reset time) or a 429-equivalent denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum RateLimitVerdict {
    /// Request admitted.
    Allowed {
        /// The window's request budget.
        limit: u32,
        /// Requests left in the current window.
        remaining: u32,
        /// When the window resets.
        reset_at: DateTime<Utc>,
    },
    /// Request denied.
    Denied {
        /// Seconds the caller should wait before retrying.
        retry_after_seconds: u64,
        /// Configured human-readable denial message.
        message: String,
    },
}

impl RateLimitVerdict {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Identifies one actor within one limiter class. Limits are enforced
/// per distinct (class, tenant, user, ip), never globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimitKey {
    /// Limiter class name (`"login"`, `"api"`, ...).
    pub class: String,
    /// Practice tenant, when the request carries one.
    pub tenant_id: Option<Uuid>,
    /// User id string, or `"anonymous"` for unauthenticated requests.
    pub user: String,
    /// Client IP.
    pub ip: IpAddr,
}

impl LimitKey {
    /// Builds a key for the given actor coordinates.
    pub fn new(class: &str, tenant_id: Option<Uuid>, user_id: Option<Uuid>, ip: IpAddr) -> Self {
        Self {
            class: class.to_string(),
            tenant_id,
            user: user_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "anonymous".to_string()),
            ip,
        }
    }
}

/// One fixed counting window.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Fixed-window rate limiter over concurrency-safe keyed counters.
///
/// Each admission check runs its read-modify-write under the dashmap
/// entry lock for its key, so two racing requests for the same actor
/// never both observe the pre-increment count.
#[derive(Debug)]
pub struct RateLimiter {
    /// Actor key → current window.
    counters: DashMap<LimitKey, WindowCounter>,
    /// Extra backoff seconds per request beyond the limit.
    penalty_per_excess_seconds: u64,
}

impl RateLimiter {
    /// Creates a limiter from rate-limit configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            counters: DashMap::new(),
            penalty_per_excess_seconds: config.penalty_per_excess_seconds,
        }
    }

    /// Runs one admission check for `key` against a window of
    /// `window_ms` / `max_requests`.
    ///
    /// A window past its reset time restarts at count 1. A denial carries
    /// the class's configured `message`, and its `retry_after_seconds` is
    /// the time to the window reset plus the escalating penalty, so repeat
    /// offenders face growing backoff.
    pub fn admit(
        &self,
        key: LimitKey,
        window_ms: u64,
        max_requests: u32,
        message: &str,
    ) -> RateLimitVerdict {
        let now = Utc::now();
        let window = Duration::milliseconds(window_ms as i64);

        let mut entry = self.counters.entry(key).or_insert(WindowCounter {
            count: 0,
            reset_at: now + window,
        });

        if now > entry.reset_at {
            entry.count = 1;
            entry.reset_at = now + window;
        } else {
            entry.count += 1;
        }

        let counter = *entry;
        let key = entry.key().clone();
        drop(entry);

        if counter.count <= max_requests {
            return RateLimitVerdict::Allowed {
                limit: max_requests,
                remaining: max_requests - counter.count,
                reset_at: counter.reset_at,
            };
        }

        let excess = u64::from(counter.count - max_requests);
        let until_reset = (counter.reset_at - now).num_seconds().max(0) as u64;
        let retry_after = until_reset + self.penalty_per_excess_seconds * excess;

        warn!(
            class = %key.class,
            user = %key.user,
            ip = %key.ip,
            count = counter.count,
            limit = max_requests,
            retry_after_seconds = retry_after,
            "Rate limit exceeded"
        );

        RateLimitVerdict::Denied {
            retry_after_seconds: retry_after,
            message: message.to_string(),
        }
    }

    /// Clears all counters belonging to a user across every limiter class
    /// (administrative surface).
    pub fn reset_user(&self, user_id: Uuid) -> usize {
        let user = user_id.to_string();
        let before = self.counters.len();
        self.counters.retain(|key, _| key.user != user);
        let removed = before - self.counters.len();
        debug!(user_id = %user_id, removed = removed, "Rate-limit counters reset");
        removed
    }

    /// Drops counters whose window has fully elapsed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.reset_at > now);
        before - self.counters.len()
    }

    /// Number of live counters (any window state).
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no counters are held.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
