//! Security alert generation and management.

pub mod manager;

pub use manager::AlertManager;
