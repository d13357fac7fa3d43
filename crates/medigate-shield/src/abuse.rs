//! Request-metadata abuse signals.

use tracing::debug;

use medigate_core::config::rate_limit::AbuseConfig;
use medigate_core::types::RequestContext;

/// Inspects request metadata for bot-like traffic.
///
/// A triggered detector does not deny the request by itself; the gate
/// reroutes the request through the strict `"abuse"` limiter class
/// instead of the endpoint's normal class.
#[derive(Debug, Clone)]
pub struct AbuseDetector {
    config: AbuseConfig,
}

impl AbuseDetector {
    /// Creates a detector from abuse configuration.
    pub fn new(config: &AbuseConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Whether the request carries an abuse signal.
    pub fn is_abusive(&self, ctx: &RequestContext) -> bool {
        match ctx.user_agent.as_deref() {
            None => {
                if self.config.flag_missing_user_agent {
                    debug!(ip = %ctx.ip, "Abuse signal: missing user-agent");
                    return true;
                }
            }
            Some(ua) => {
                let lowered = ua.to_lowercase();
                if self
                    .config
                    .bot_ua_patterns
                    .iter()
                    .any(|pattern| lowered.contains(&pattern.to_lowercase()))
                {
                    debug!(ip = %ctx.ip, "Abuse signal: bot-like user-agent");
                    return true;
                }
            }
        }

        if self.config.flag_missing_accept_header && !ctx.has_accept_header {
            debug!(ip = %ctx.ip, "Abuse signal: missing accept header");
            return true;
        }

        false
    }
}
