//! # medigate-shield
//!
//! Request admission control for the MediGate platform: fixed-window rate
//! limiting with escalating penalties, bot/abuse detection, and a
//! self-expiring IP blacklist.
//!
//! ## Modules
//!
//! - `limiter` — keyed fixed-window counters and admission verdicts
//! - `abuse` — request-metadata abuse signals
//! - `blacklist` — temporary IP bans
//! - `gate` — the combined per-request admission check
//! - `cleanup` — periodic expiry sweep for counters and bans

pub mod abuse;
pub mod blacklist;
pub mod cleanup;
pub mod gate;
pub mod limiter;

pub use abuse::AbuseDetector;
pub use blacklist::IpBlacklist;
pub use cleanup::ShieldSweeper;
pub use gate::RequestShield;
pub use limiter::{RateLimitVerdict, RateLimiter};
