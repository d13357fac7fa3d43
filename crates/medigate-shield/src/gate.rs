//! The combined per-request admission check.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use medigate_core::config::rate_limit::RateLimitConfig;
use medigate_core::types::{AuthIdentity, RequestContext};

use crate::abuse::AbuseDetector;
use crate::blacklist::IpBlacklist;
use crate::limiter::{LimitKey, RateLimitVerdict, RateLimiter};

const BLACKLIST_MESSAGE: &str = "Access temporarily restricted.";
const ABUSE_CLASS: &str = "abuse";

/// Runs the full admission pipeline for one request: IP blacklist,
/// role bypass, abuse rerouting, then the class's rate counter.
///
/// Fail-open: a request against a limiter class that is missing from
/// configuration is admitted (and logged), never locked out on a
/// deployment mistake. The authentication stack is the fail-closed side.
pub struct RequestShield {
    limiter: Arc<RateLimiter>,
    abuse: AbuseDetector,
    blacklist: Arc<IpBlacklist>,
    config: RateLimitConfig,
}

impl std::fmt::Debug for RequestShield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestShield").finish()
    }
}

impl RequestShield {
    /// Creates the shield and its component stores from configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(&config)),
            abuse: AbuseDetector::new(&config.abuse),
            blacklist: Arc::new(IpBlacklist::new()),
            config,
        }
    }

    /// Checks whether a request may proceed under the named limiter class.
    pub fn check(
        &self,
        class: &str,
        identity: Option<&AuthIdentity>,
        ctx: &RequestContext,
    ) -> RateLimitVerdict {
        if self.blacklist.is_banned(ctx.ip) {
            let retry_after = self.blacklist.remaining_seconds(ctx.ip).unwrap_or(0);
            warn!(ip = %ctx.ip, class = class, "Request from blacklisted IP denied");
            return RateLimitVerdict::Denied {
                retry_after_seconds: retry_after,
                message: BLACKLIST_MESSAGE.to_string(),
            };
        }

        // Abuse signals override the endpoint's class with the strict one.
        let effective_class = if self.abuse.is_abusive(ctx) {
            ABUSE_CLASS
        } else {
            class
        };

        let Some(class_config) = self.config.classes.get(effective_class) else {
            warn!(
                class = effective_class,
                "Unknown limiter class, admitting request"
            );
            return RateLimitVerdict::Allowed {
                limit: 0,
                remaining: 0,
                reset_at: chrono::Utc::now(),
            };
        };

        if let Some(identity) = identity {
            let role = identity.role.to_string();
            if class_config.bypass_roles.iter().any(|r| *r == role) {
                return RateLimitVerdict::Allowed {
                    limit: class_config.max_requests,
                    remaining: class_config.max_requests,
                    reset_at: chrono::Utc::now(),
                };
            }
        }

        let key = LimitKey::new(
            effective_class,
            identity.map(|i| i.tenant_id),
            identity.map(|i| i.user_id),
            ctx.ip,
        );
        let verdict = self.limiter.admit(
            key,
            class_config.window_ms,
            class_config.max_requests,
            &class_config.message,
        );

        // An abusive actor that also blows through the strict class
        // earns a temporary IP ban.
        if !verdict.is_allowed() && effective_class == ABUSE_CLASS {
            self.blacklist.ban(ctx.ip, self.config.ip_blacklist_minutes);
            info!(ip = %ctx.ip, "Abusive traffic exceeded limits, IP banned");
        }

        verdict
    }

    /// Clears a user's rate-limit counters (administrative surface).
    pub fn reset_user(&self, user_id: Uuid) -> usize {
        self.limiter.reset_user(user_id)
    }

    /// The underlying limiter store.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// The underlying blacklist store.
    pub fn blacklist(&self) -> Arc<IpBlacklist> {
        Arc::clone(&self.blacklist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medigate_core::types::UserRole;

    fn shield() -> RequestShield {
        RequestShield::new(RateLimitConfig::default())
    }

    fn browser_request() -> RequestContext {
        RequestContext::new("203.0.113.10".parse().unwrap(), "Mozilla/5.0 Firefox/128.0")
    }

    fn identity(role: UserRole) -> AuthIdentity {
        AuthIdentity {
            user_id: Uuid::new_v4(),
            email: "user@example-practice.test".to_string(),
            role,
            tenant_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_login_class_denies_past_limit() {
        let shield = shield();
        let ctx = browser_request();

        // Default login budget is 5/minute.
        for _ in 0..5 {
            assert!(shield.check("login", None, &ctx).is_allowed());
        }
        let verdict = shield.check("login", None, &ctx);
        match verdict {
            RateLimitVerdict::Denied { message, .. } => {
                assert!(message.contains("login"));
            }
            RateLimitVerdict::Allowed { .. } => panic!("6th login attempt should be denied"),
        }
    }

    #[test]
    fn test_admin_bypasses_api_but_not_login() {
        let shield = shield();
        let ctx = browser_request();
        let admin = identity(UserRole::Admin);

        for _ in 0..500 {
            assert!(shield.check("api", Some(&admin), &ctx).is_allowed());
        }

        for _ in 0..5 {
            shield.check("login", Some(&admin), &ctx);
        }
        assert!(!shield.check("login", Some(&admin), &ctx).is_allowed());
    }

    #[test]
    fn test_abusive_request_is_rerouted_to_strict_class() {
        let shield = shield();
        let mut ctx = browser_request();
        ctx.user_agent = Some("scrapy/2.11".to_string());

        // The api class would allow 120/min, but the abuse class caps at 5.
        for _ in 0..5 {
            assert!(shield.check("api", None, &ctx).is_allowed());
        }
        assert!(!shield.check("api", None, &ctx).is_allowed());
    }

    #[test]
    fn test_abuse_denial_bans_the_ip_for_all_classes() {
        let shield = shield();
        let mut bot = browser_request();
        bot.user_agent = Some("crawler/1.0".to_string());

        for _ in 0..6 {
            shield.check("api", None, &bot);
        }
        assert!(shield.blacklist().is_banned(bot.ip));

        // Even a clean request from the same IP is now refused.
        let clean = browser_request();
        let verdict = shield.check("login", None, &clean);
        match verdict {
            RateLimitVerdict::Denied { message, .. } => {
                assert_eq!(message, BLACKLIST_MESSAGE);
            }
            RateLimitVerdict::Allowed { .. } => panic!("blacklisted IP should be denied"),
        }
    }

    #[test]
    fn test_unknown_class_fails_open() {
        let shield = shield();
        let ctx = browser_request();

        assert!(shield.check("no-such-class", None, &ctx).is_allowed());
    }

    #[test]
    fn test_reset_user_restores_budget() {
        let shield = shield();
        let ctx = browser_request();
        let user = identity(UserRole::Practitioner);

        for _ in 0..5 {
            shield.check("login", Some(&user), &ctx);
        }
        assert!(!shield.check("login", Some(&user), &ctx).is_allowed());

        assert!(shield.reset_user(user.user_id) > 0);
        assert!(shield.check("login", Some(&user), &ctx).is_allowed());
    }
}
