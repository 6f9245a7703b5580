//! Point Cache - per-user point caching with store fallback
//!
//! Provides a TTL/LRU point cache in front of a point store, fire-and-forget
//! creation notifications and miss-streak statistics.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod service;
pub mod statistics;
pub mod store;
pub mod tasks;

#[cfg(test)]
mod test_support;

pub use app::AppState;
pub use config::Config;
pub use hit_test::check_inside;
pub use tasks::{spawn_cache_maintenance_task, spawn_statistics_consumer};
