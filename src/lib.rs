//! querycache - An in-process read-through query cache
//!
//! Shields a database from repeated identical queries with TTL expiry,
//! stampede-coalesced producers, category invalidation, and batched
//! lookups.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{bundle_key, cache_key, CacheManager, CacheStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
