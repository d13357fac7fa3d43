//! Token pair issuance, verification, and revocation.

pub mod encoder;
pub mod decoder;
pub mod rejection;

pub use decoder::TokenVerifier;
pub use encoder::TokenIssuer;
pub use rejection::TokenRejection;

/// Computes the SHA-256 hex digest of a raw token string.
///
/// Revocation entries and logs reference tokens only through this digest;
/// raw token contents are never stored or logged.
pub(crate) fn token_digest(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
