//! Typed verification verdicts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a presented token was rejected.
///
/// Verification never propagates an error past the component boundary:
/// every outcome is one of these reason codes, and callers must
/// re-authenticate or re-refresh rather than retry. Internal failures are
/// folded in as [`TokenRejection::Internal`] — the verifier fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// The token has been revoked (logout or rotation).
    #[error("token has been revoked")]
    Revoked,
    /// The token's expiration has passed.
    #[error("token has expired")]
    Expired,
    /// The token could not be parsed.
    #[error("malformed token")]
    Malformed,
    /// Signature, issuer, or audience check failed for this token class.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The token-type claim does not match the expected class.
    #[error("wrong token type")]
    WrongType,
    /// The embedded session is gone, inactive, or owned by someone else.
    #[error("session is no longer valid")]
    SessionGone,
    /// An internal error occurred; treated as a denial (fail-closed).
    #[error("verification failed")]
    Internal,
}

impl TokenRejection {
    /// Stable reason code for logs and response metadata.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Revoked => "revoked",
            Self::Expired => "expired",
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::WrongType => "wrong_type",
            Self::SessionGone => "session_gone",
            Self::Internal => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_wire_format() {
        assert_eq!(TokenRejection::Revoked.code(), "revoked");
        assert_eq!(TokenRejection::Expired.code(), "expired");
        assert_eq!(TokenRejection::InvalidSignature.code(), "invalid_signature");
        assert_eq!(TokenRejection::SessionGone.code(), "session_gone");

        // code() and the serde rename agree, so logs and response
        // bodies use the same identifier.
        let serialized = serde_json::to_string(&TokenRejection::WrongType).unwrap();
        assert_eq!(serialized, format!("\"{}\"", TokenRejection::WrongType.code()));
    }
}
