//! # medigate-core
//!
//! Core crate for the MediGate security subsystem. Contains configuration
//! schemas, identity types, the cache-provider trait, logging setup, and the
//! unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other MediGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
