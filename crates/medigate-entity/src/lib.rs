//! # medigate-entity
//!
//! Domain entities for the MediGate security subsystem: sessions, device
//! fingerprints, security alerts, and token claim types.

pub mod alert;
pub mod device;
pub mod session;

pub use alert::{AlertSeverity, AlertType, SecurityAlert};
pub use device::DeviceFingerprint;
pub use session::{ActivityEntry, Session, TerminationReason};
pub use session::token::{AccessClaims, RefreshClaims, TokenPair, TokenType};
