//! Session domain entities.

pub mod model;
pub mod token;

pub use model::{ActivityEntry, Session, TerminationReason};
pub use token::{AccessClaims, RefreshClaims, TokenPair, TokenType};
