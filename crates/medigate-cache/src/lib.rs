//! # medigate-cache
//!
//! TTL'd key-value providers implementing [`medigate_core::traits::CacheProvider`].
//! The in-memory provider ships with the subsystem; the [`provider::CacheManager`]
//! dispatcher is where a shared external store plugs in for multi-node
//! deployments without changing any component contract.

pub mod keys;
pub mod memory;
pub mod provider;

pub use memory::MemoryCacheProvider;
pub use provider::CacheManager;
