//! Session lifecycle manager — login, logout, refresh token flows.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use medigate_core::config::auth::AuthConfig;
use medigate_core::error::AppError;
use medigate_core::result::AppResult;
use medigate_core::types::AuthIdentity;
use medigate_entity::session::{Session, TerminationReason};
use medigate_entity::session::token::{AccessClaims, TokenPair};

use crate::jwt::{TokenIssuer, TokenRejection, TokenVerifier};

use super::store::SessionStore;
use super::tracker::{LoginContext, SessionTracker};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// Created session.
    pub session: Session,
}

/// Manages the complete session lifecycle.
///
/// Token verification paths return [`TokenRejection`] reason codes and are
/// fail-closed; administrative operations return [`AppError`].
pub struct SessionManager {
    /// Token pair issuance.
    issuer: Arc<TokenIssuer>,
    /// Token verification and revocation.
    verifier: Arc<TokenVerifier>,
    /// Keyed session state.
    store: Arc<SessionStore>,
    /// Session creation orchestration.
    tracker: Arc<SessionTracker>,
    /// Refresh token lifetime, for revocation entry TTLs.
    refresh_ttl_seconds: u64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        issuer: Arc<TokenIssuer>,
        verifier: Arc<TokenVerifier>,
        store: Arc<SessionStore>,
        tracker: Arc<SessionTracker>,
        auth_config: &AuthConfig,
    ) -> Self {
        Self {
            issuer,
            verifier,
            store,
            tracker,
            refresh_ttl_seconds: auth_config.refresh_ttl_days * 24 * 3600,
        }
    }

    /// Performs the login flow for an already-authenticated identity:
    /// creates the session (with fingerprinting, risk scoring, cap
    /// enforcement, and alerting) and issues the token pair bound to it.
    pub async fn login(
        &self,
        identity: &AuthIdentity,
        ctx: &LoginContext,
    ) -> AppResult<LoginResult> {
        let session = self.tracker.create(identity, ctx).await;
        let tokens = self.issuer.issue(identity, session.id)?;

        info!(
            user_id = %identity.user_id,
            session_id = %session.id,
            "Login successful"
        );

        Ok(LoginResult { tokens, session })
    }

    /// The per-request gate: verifies the access token, confirms the
    /// embedded session is still live, and records activity on it.
    pub async fn authenticate(&self, access_token: &str) -> Result<AccessClaims, TokenRejection> {
        let claims = self
            .verifier
            .verify_access(access_token)
            .await
            .inspect_err(|rejection| {
                debug!(reason = rejection.code(), "Access token rejected");
            })?;

        if self.verifier.is_session_blocked(claims.sid).await? {
            return Err(TokenRejection::SessionGone);
        }
        if !self.store.touch(claims.sid, "api_request") {
            return Err(TokenRejection::SessionGone);
        }

        Ok(claims)
    }

    /// Refreshes a token pair using a valid refresh token.
    ///
    /// The presented refresh token is revoked before the new pair is
    /// issued, so a refresh token is single-use: a second presentation —
    /// concurrent or later — fails as [`TokenRejection::Revoked`].
    pub async fn refresh(
        &self,
        refresh_token: &str,
        identity: &AuthIdentity,
    ) -> Result<TokenPair, TokenRejection> {
        let claims = self
            .verifier
            .verify_refresh(refresh_token)
            .await
            .inspect_err(|rejection| {
                debug!(reason = rejection.code(), "Refresh token rejected");
            })?;

        if claims.sub != identity.user_id {
            warn!(
                token_user = %claims.sub,
                request_user = %identity.user_id,
                "Refresh token presented by a different user"
            );
            return Err(TokenRejection::SessionGone);
        }

        if self.verifier.is_session_blocked(claims.sid).await? {
            return Err(TokenRejection::SessionGone);
        }

        let session = self
            .store
            .get(claims.sid)
            .ok_or(TokenRejection::SessionGone)?;
        if session.user_id != identity.user_id {
            return Err(TokenRejection::SessionGone);
        }

        // Rotation point: first caller to revoke wins the new pair.
        let fresh = self
            .verifier
            .try_revoke(refresh_token, claims.remaining_ttl_seconds())
            .await?;
        if !fresh {
            warn!(
                user_id = %identity.user_id,
                session_id = %claims.sid,
                "Refresh token replay detected"
            );
            return Err(TokenRejection::Revoked);
        }

        let tokens = self.issuer.issue(identity, claims.sid).map_err(|e| {
            warn!(error = %e, "Token issuance failed during refresh");
            TokenRejection::Internal
        })?;

        self.store.touch(claims.sid, "token_refresh");

        info!(
            user_id = %identity.user_id,
            session_id = %claims.sid,
            "Token pair rotated"
        );

        Ok(tokens)
    }

    /// Performs the logout flow: revokes the presented tokens, blocks the
    /// session, and deactivates it.
    pub async fn logout(
        &self,
        access_token: &str,
        claims: &AccessClaims,
        refresh_token: Option<&str>,
    ) -> AppResult<()> {
        self.verifier
            .revoke(access_token, claims.remaining_ttl_seconds())
            .await
            .map_err(rejection_to_internal)?;

        if let Some(token) = refresh_token {
            self.verifier
                .revoke(token, self.refresh_ttl_seconds)
                .await
                .map_err(rejection_to_internal)?;
        }

        self.verifier
            .block_session(claims.sid)
            .await
            .map_err(rejection_to_internal)?;

        self.store
            .terminate(claims.sid, TerminationReason::Logout, Some(claims.sub));

        info!(user_id = %claims.sub, session_id = %claims.sid, "Logout completed");
        Ok(())
    }

    /// Terminates a session by an administrator.
    pub async fn admin_terminate(&self, session_id: Uuid, admin_id: Uuid) -> AppResult<()> {
        let session = self
            .store
            .get(session_id)
            .ok_or_else(|| AppError::not_found("Session not found or already inactive"))?;

        self.verifier
            .block_session(session_id)
            .await
            .map_err(rejection_to_internal)?;

        self.store.terminate(
            session_id,
            TerminationReason::AdminTermination,
            Some(admin_id),
        );

        info!(
            session_id = %session_id,
            admin_id = %admin_id,
            user_id = %session.user_id,
            "Admin terminated session"
        );
        Ok(())
    }

    /// Terminates all active sessions of a user, optionally sparing one
    /// (e.g. the admin's own current session).
    pub async fn terminate_all_user_sessions(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        except: Option<Uuid>,
    ) -> AppResult<u32> {
        let sessions = self.store.active_for_user(user_id);
        let mut terminated = 0u32;

        for session in sessions {
            if Some(session.id) == except {
                continue;
            }
            // Best-effort: a failed session block does not stop the rest.
            if let Err(e) = self.verifier.block_session(session.id).await {
                warn!(session_id = %session.id, error = %e, "Failed to block session");
            }
            if self.store.terminate(
                session.id,
                TerminationReason::AdminTermination,
                Some(admin_id),
            ) {
                terminated += 1;
            }
        }

        info!(
            user_id = %user_id,
            admin_id = %admin_id,
            terminated = terminated,
            "Terminated all user sessions"
        );
        Ok(terminated)
    }

    /// Lists a user's sessions for the administrative surface (any state).
    pub fn list_sessions(&self, user_id: Uuid) -> Vec<Session> {
        self.store.sessions_for_user(user_id)
    }
}

fn rejection_to_internal(rejection: TokenRejection) -> AppError {
    AppError::internal(format!("Revocation store failure: {rejection}"))
}
