//! Authenticated identity claim consumed from upstream authentication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles within a practice tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Practice administrator.
    Admin,
    /// Medical practitioner (doctor, therapist).
    Practitioner,
    /// Front-desk and assistant staff.
    Staff,
    /// Patient self-service account.
    Patient,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Practitioner => write!(f, "practitioner"),
            Self::Staff => write!(f, "staff"),
            Self::Patient => write!(f, "patient"),
        }
    }
}

/// The authenticated identity attached to each request after upstream
/// credential validation.
///
/// The security subsystem consumes this claim and emits authorization
/// decisions; it does not itself validate business data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// The authenticated user.
    pub user_id: Uuid,
    /// Contact email carried into access token claims.
    pub email: String,
    /// Role at the time of authentication.
    pub role: UserRole,
    /// The practice tenant this identity belongs to.
    pub tenant_id: Uuid,
}
