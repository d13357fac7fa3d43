//! Token verification and revocation checking.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::{debug, warn};
use uuid::Uuid;

use medigate_cache::{CacheManager, keys};
use medigate_core::config::auth::AuthConfig;
use medigate_core::traits::CacheProvider;

use medigate_entity::session::token::{AccessClaims, RefreshClaims, TokenType};

use super::rejection::TokenRejection;
use super::token_digest;

/// Floor for revocation entry TTLs, to cover clock skew around expiry.
const MIN_REVOCATION_TTL: Duration = Duration::from_secs(60);

/// Validates tokens against their class-specific secret/issuer/audience
/// and checks the revocation blacklist.
///
/// Fail-closed: any internal error during verification surfaces as
/// [`TokenRejection::Internal`], never as a false "authenticated" outcome.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC key for access token verification.
    access_key: DecodingKey,
    /// HMAC key for refresh token verification.
    refresh_key: DecodingKey,
    /// Validation rules for the access class.
    access_validation: Validation,
    /// Validation rules for the refresh class.
    refresh_validation: Validation,
    /// Revocation blacklist backing store.
    cache: Arc<CacheManager>,
    /// TTL for session-level blocks.
    session_block_ttl: Duration,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("access_validation", &self.access_validation)
            .field("refresh_validation", &self.refresh_validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        let mut access_validation = Validation::new(Algorithm::HS256);
        access_validation.validate_exp = true;
        access_validation.leeway = config.leeway_seconds;
        access_validation.set_issuer(&[&config.access.issuer]);
        access_validation.set_audience(&[&config.access.audience]);

        let mut refresh_validation = Validation::new(Algorithm::HS256);
        refresh_validation.validate_exp = true;
        refresh_validation.leeway = config.leeway_seconds;
        refresh_validation.set_issuer(&[&config.refresh.issuer]);
        refresh_validation.set_audience(&[&config.refresh.audience]);

        // Session blocks must outlive the longest refresh token.
        let session_block_ttl =
            Duration::from_secs((config.refresh_ttl_days + 1) * 24 * 3600);

        Self {
            access_key: DecodingKey::from_secret(config.access.secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh.secret.as_bytes()),
            access_validation,
            refresh_validation,
            cache,
            session_block_ttl,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks, in order: revocation set membership, signature/issuer/
    /// audience, expiration, token type.
    pub async fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        self.check_revoked(token).await?;

        let data = decode::<AccessClaims>(token, &self.access_key, &self.access_validation)
            .map_err(map_decode_error)?;

        if data.claims.token_type != TokenType::Access {
            return Err(TokenRejection::WrongType);
        }

        Ok(data.claims)
    }

    /// Decodes and validates a refresh token string.
    pub async fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenRejection> {
        self.check_revoked(token).await?;

        let data = decode::<RefreshClaims>(token, &self.refresh_key, &self.refresh_validation)
            .map_err(map_decode_error)?;

        if data.claims.token_type != TokenType::Refresh {
            return Err(TokenRejection::WrongType);
        }

        Ok(data.claims)
    }

    /// Adds a token to the revocation blacklist.
    ///
    /// The entry's TTL is the remaining token lifetime (floored), so the
    /// backing store drops it exactly when the token would have expired
    /// anyway — no separate sweep is needed for the blacklist.
    pub async fn revoke(&self, token: &str, remaining_ttl_seconds: u64) -> Result<(), TokenRejection> {
        let key = keys::revoked_token(&token_digest(token));
        let ttl = Duration::from_secs(remaining_ttl_seconds).max(MIN_REVOCATION_TTL);
        self.cache
            .set(&key, "revoked", ttl)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to write revocation entry");
                TokenRejection::Internal
            })?;
        debug!("Token revoked");
        Ok(())
    }

    /// Atomically revokes a token, reporting whether this call was the one
    /// that inserted the entry.
    ///
    /// Token rotation rides on this: the first `refresh` call revokes the
    /// presented token and wins; a concurrent or later replay observes the
    /// existing entry and is rejected as [`TokenRejection::Revoked`].
    pub async fn try_revoke(
        &self,
        token: &str,
        remaining_ttl_seconds: u64,
    ) -> Result<bool, TokenRejection> {
        let key = keys::revoked_token(&token_digest(token));
        let ttl = Duration::from_secs(remaining_ttl_seconds).max(MIN_REVOCATION_TTL);
        self.cache.set_nx(&key, "revoked", ttl).await.map_err(|e| {
            warn!(error = %e, "Failed to write revocation entry");
            TokenRejection::Internal
        })
    }

    /// Checks whether the given raw token string has been revoked.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, TokenRejection> {
        let key = keys::revoked_token(&token_digest(token));
        self.cache.exists(&key).await.map_err(|e| {
            warn!(error = %e, "Revocation lookup failed, failing closed");
            TokenRejection::Internal
        })
    }

    /// Blocks every token bound to a session (used on logout and
    /// administrative termination).
    pub async fn block_session(&self, session_id: Uuid) -> Result<(), TokenRejection> {
        let key = keys::session_block(session_id);
        self.cache
            .set(&key, "blocked", self.session_block_ttl)
            .await
            .map_err(|e| {
                warn!(session_id = %session_id, error = %e, "Failed to block session");
                TokenRejection::Internal
            })
    }

    /// Checks whether a session has been fully blocked.
    pub async fn is_session_blocked(&self, session_id: Uuid) -> Result<bool, TokenRejection> {
        let key = keys::session_block(session_id);
        self.cache.exists(&key).await.map_err(|e| {
            warn!(session_id = %session_id, error = %e, "Session block lookup failed, failing closed");
            TokenRejection::Internal
        })
    }

    async fn check_revoked(&self, token: &str) -> Result<(), TokenRejection> {
        if self.is_revoked(token).await? {
            return Err(TokenRejection::Revoked);
        }
        Ok(())
    }
}

/// Maps jsonwebtoken decode errors onto typed rejection codes.
fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenRejection {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::ImmatureSignature => TokenRejection::InvalidSignature,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            TokenRejection::Malformed
        }
        _ => TokenRejection::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use medigate_core::config::cache::CacheConfig;
    use medigate_core::types::{AuthIdentity, UserRole};

    use crate::jwt::TokenIssuer;

    fn setup() -> (TokenIssuer, TokenVerifier) {
        let config = AuthConfig::default();
        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        (TokenIssuer::new(&config), TokenVerifier::new(&config, cache))
    }

    fn identity() -> AuthIdentity {
        AuthIdentity {
            user_id: Uuid::new_v4(),
            email: "doctor@example-practice.test".to_string(),
            role: UserRole::Practitioner,
            tenant_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_revocation_entry_ttl_is_floored() {
        let (issuer, verifier) = setup();
        let pair = issuer.issue(&identity(), Uuid::new_v4()).unwrap();

        // A token at the very end of its life still gets a revocation
        // entry that covers clock skew; a zero TTL would let the entry
        // vanish immediately and the token pass verification again.
        verifier.revoke(&pair.access_token, 0).await.unwrap();

        assert!(verifier.is_revoked(&pair.access_token).await.unwrap());
        assert!(matches!(
            verifier.verify_access(&pair.access_token).await,
            Err(TokenRejection::Revoked)
        ));
    }

    #[tokio::test]
    async fn test_try_revoke_reports_only_the_first_insert() {
        let (issuer, verifier) = setup();
        let pair = issuer.issue(&identity(), Uuid::new_v4()).unwrap();

        assert!(verifier.try_revoke(&pair.refresh_token, 3600).await.unwrap());
        assert!(!verifier.try_revoke(&pair.refresh_token, 3600).await.unwrap());
    }
}
