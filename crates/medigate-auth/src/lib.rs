//! # medigate-auth
//!
//! Token issuance/verification, session lifecycle, device fingerprinting,
//! risk scoring, and security alerting for the MediGate platform.
//!
//! ## Modules
//!
//! - `jwt` — token pair issuance, verification, and revocation
//! - `session` — session store, lifecycle manager, risk scoring, sweep
//! - `alert` — security alert generation with cooldown deduplication

pub mod alert;
pub mod jwt;
pub mod session;

pub use alert::AlertManager;
pub use jwt::{TokenIssuer, TokenRejection, TokenVerifier};
pub use session::{
    DeviceAttrs, DeviceRegistry, RiskScorer, RiskSignals, SessionManager, SessionStore,
    SessionSweeper, SessionTracker,
};
