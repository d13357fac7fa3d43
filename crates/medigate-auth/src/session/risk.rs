//! Heuristic session risk scoring.

use std::net::IpAddr;

use medigate_core::config::session::RiskConfig;

/// Boolean signals computed by the session tracker before scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSignals {
    /// The device fingerprint is new or stale.
    pub new_device: bool,
    /// The user created a burst of recent logins.
    pub login_burst: bool,
    /// Upstream geolocation heuristic flagged the login location.
    pub unusual_geolocation: bool,
}

/// Computes the 0–100 risk score for a new session.
///
/// A weighted sum of the configured signals, capped at 100. The weights
/// are operational tuning knobs, not derived values.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    /// Creates a scorer from risk configuration.
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// The score above which a session counts as high risk.
    pub fn high_risk_threshold(&self) -> u8 {
        self.config.high_risk_threshold
    }

    /// Scores a new session from its login metadata and signals.
    pub fn score(&self, ip: IpAddr, user_agent: Option<&str>, signals: RiskSignals) -> u8 {
        let mut score: u32 = 0;

        if signals.new_device {
            score += u32::from(self.config.new_device);
        }
        if self.is_suspicious_user_agent(user_agent) {
            score += u32::from(self.config.suspicious_user_agent);
        }
        if self.is_suspicious_ip(ip) {
            score += u32::from(self.config.suspicious_ip);
        }
        if signals.unusual_geolocation {
            score += u32::from(self.config.unusual_geolocation);
        }
        if signals.login_burst {
            score += u32::from(self.config.login_burst);
        }

        score.min(100) as u8
    }

    fn is_suspicious_user_agent(&self, user_agent: Option<&str>) -> bool {
        let Some(ua) = user_agent else {
            // No user-agent at all reads like tooling, not a browser.
            return true;
        };
        let lowered = ua.to_lowercase();
        self.config
            .suspicious_ua_patterns
            .iter()
            .any(|pattern| lowered.contains(&pattern.to_lowercase()))
    }

    fn is_suspicious_ip(&self, ip: IpAddr) -> bool {
        let text = ip.to_string();
        self.config
            .suspicious_ip_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RiskScorer {
        RiskScorer::new(RiskConfig::default())
    }

    fn ip() -> IpAddr {
        "203.0.113.10".parse().unwrap()
    }

    #[test]
    fn test_clean_login_scores_zero() {
        let score = scorer().score(ip(), Some("Mozilla/5.0"), RiskSignals::default());
        assert_eq!(score, 0);
    }

    #[test]
    fn test_new_device_weight() {
        let signals = RiskSignals {
            new_device: true,
            ..Default::default()
        };
        assert_eq!(scorer().score(ip(), Some("Mozilla/5.0"), signals), 30);
    }

    #[test]
    fn test_suspicious_user_agent_weight() {
        let score = scorer().score(ip(), Some("curl/8.4.0"), RiskSignals::default());
        assert_eq!(score, 20);
    }

    #[test]
    fn test_missing_user_agent_is_suspicious() {
        let score = scorer().score(ip(), None, RiskSignals::default());
        assert_eq!(score, 20);
    }

    #[test]
    fn test_suspicious_ip_prefix() {
        let mut config = RiskConfig::default();
        config.suspicious_ip_prefixes = vec!["203.0.".to_string()];
        let scorer = RiskScorer::new(config);
        assert_eq!(scorer.score(ip(), Some("Mozilla/5.0"), RiskSignals::default()), 25);
    }

    #[test]
    fn test_score_is_capped() {
        let mut config = RiskConfig::default();
        config.suspicious_ip_prefixes = vec!["203.0.".to_string()];
        let scorer = RiskScorer::new(config);
        let signals = RiskSignals {
            new_device: true,
            login_burst: true,
            unusual_geolocation: true,
        };
        // 30 + 20 + 25 + 15 + 10 = 100, capped either way.
        let score = scorer.score(ip(), Some("python-requests/2.31"), signals);
        assert_eq!(score, 100);
    }
}
