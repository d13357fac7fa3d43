//! Token pair creation with per-class signing keys.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use medigate_core::config::auth::AuthConfig;
use medigate_core::error::AppError;
use medigate_core::types::AuthIdentity;

use medigate_entity::session::token::{AccessClaims, RefreshClaims, TokenPair, TokenType};

/// Creates signed access and refresh tokens.
///
/// Each token class is signed with its own secret and stamped with its own
/// issuer/audience pair, so the refresh verifier structurally rejects
/// access tokens and vice versa.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC key for access tokens.
    access_key: EncodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: EncodingKey,
    /// Access issuer/audience.
    access_issuer: String,
    access_audience: String,
    /// Refresh issuer/audience.
    refresh_issuer: String,
    refresh_audience: String,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
    /// Refresh token TTL in days.
    refresh_ttl_days: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_issuer", &self.access_issuer)
            .field("refresh_issuer", &self.refresh_issuer)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access.secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh.secret.as_bytes()),
            access_issuer: config.access.issuer.clone(),
            access_audience: config.access.audience.clone(),
            refresh_issuer: config.refresh.issuer.clone(),
            refresh_audience: config.refresh.audience.clone(),
            access_ttl_minutes: config.access_ttl_minutes as i64,
            refresh_ttl_days: config.refresh_ttl_days as i64,
        }
    }

    /// Generates a new access + refresh token pair bound to the given session.
    pub fn issue(&self, identity: &AuthIdentity, session_id: Uuid) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access_exp = now + chrono::Duration::minutes(self.access_ttl_minutes);
        let refresh_exp = now + chrono::Duration::days(self.refresh_ttl_days);

        let access_claims = AccessClaims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            tid: identity.tenant_id,
            sid: session_id,
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            iss: self.access_issuer.clone(),
            aud: self.access_audience.clone(),
        };

        let refresh_claims = RefreshClaims {
            sub: identity.user_id,
            sid: session_id,
            token_type: TokenType::Refresh,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            iss: self.refresh_issuer.clone(),
            aud: self.refresh_audience.clone(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: (access_exp - now).num_seconds().max(0) as u64,
            refresh_expires_in: (refresh_exp - now).num_seconds().max(0) as u64,
        })
    }
}
