//! Session lifecycle: store, tracker, manager, risk scoring, and sweep.

pub mod cleanup;
pub mod fingerprint;
pub mod manager;
pub mod risk;
pub mod store;
pub mod tracker;

pub use cleanup::SessionSweeper;
pub use fingerprint::{DeviceAttrs, DeviceRegistry};
pub use manager::{LoginResult, SessionManager};
pub use risk::{RiskScorer, RiskSignals};
pub use store::{SessionStore, SweepStats};
pub use tracker::{LoginContext, SessionTracker};
