//! Cache key builders for all MediGate cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the subsystem uses.

use uuid::Uuid;

/// Prefix applied to all MediGate cache keys.
const PREFIX: &str = "medigate";

/// Cache key for a revoked token, by hex digest of the raw token string.
pub fn revoked_token(token_hash: &str) -> String {
    format!("{PREFIX}:revoked:{token_hash}")
}

/// Cache key for a session-level block (all tokens of the session rejected).
pub fn session_block(session_id: Uuid) -> String {
    format!("{PREFIX}:session_block:{session_id}")
}
