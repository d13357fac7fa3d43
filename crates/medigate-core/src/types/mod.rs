//! Shared identity and request metadata types.

pub mod identity;
pub mod request;

pub use identity::{AuthIdentity, UserRole};
pub use request::RequestContext;
