//! Token claim types for access and refresh tokens.
//!
//! The two token classes carry disjoint claim sets and are verified against
//! distinct secrets, issuers, and audiences, so an access token can never
//! be replayed as a refresh token or vice versa.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medigate_core::types::UserRole;

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    Access,
    /// Long-lived, single-use refresh token.
    Refresh,
}

/// Claims payload embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Contact email at issuance time.
    pub email: String,
    /// User role at issuance time.
    pub role: UserRole,
    /// Tenant the user belongs to.
    pub tid: Uuid,
    /// Session ID this token belongs to.
    pub sid: Uuid,
    /// Token type discriminator.
    pub token_type: TokenType,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

impl AccessClaims {
    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - chrono::Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}

/// Claims payload embedded in every refresh token.
///
/// Deliberately narrower than [`AccessClaims`]: a refresh token proves
/// nothing about role or tenant, only the right to mint a new pair for
/// its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Session ID this token belongs to.
    pub sid: Uuid,
    /// Token type discriminator.
    pub token_type: TokenType,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

impl RefreshClaims {
    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - chrono::Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}

/// The pair returned to clients on login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: u64,
}
