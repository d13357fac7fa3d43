//! Security alert configuration.

use serde::{Deserialize, Serialize};

/// Security alert manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Cooldown window in minutes during which a repeated (user, alert type)
    /// pair is suppressed rather than stored.
    #[serde(default = "default_cooldown")]
    pub cooldown_minutes: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: default_cooldown(),
        }
    }
}

fn default_cooldown() -> u64 {
    60
}
