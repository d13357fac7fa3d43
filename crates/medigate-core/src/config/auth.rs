//! Token issuance and verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for one token class (access or refresh).
///
/// Access and refresh tokens are signed with distinct secrets and carry
/// distinct issuer/audience pairs so the two classes are never mutually
/// substitutable, even if a signature check alone would pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClassConfig {
    /// Secret key for HMAC-SHA256 signing.
    pub secret: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
}

/// Authentication and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing parameters for access tokens.
    #[serde(default = "default_access_class")]
    pub access: TokenClassConfig,
    /// Signing parameters for refresh tokens.
    #[serde(default = "default_refresh_class")]
    pub refresh: TokenClassConfig,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Clock-skew leeway applied during verification, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access: default_access_class(),
            refresh: default_refresh_class(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_access_class() -> TokenClassConfig {
    TokenClassConfig {
        secret: "CHANGE_ME_ACCESS_IN_PRODUCTION".to_string(),
        issuer: "medigate-auth".to_string(),
        audience: "medigate-api".to_string(),
    }
}

fn default_refresh_class() -> TokenClassConfig {
    TokenClassConfig {
        secret: "CHANGE_ME_REFRESH_IN_PRODUCTION".to_string(),
        issuer: "medigate-auth-refresh".to_string(),
        audience: "medigate-refresh".to_string(),
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_leeway() -> u64 {
    5
}
