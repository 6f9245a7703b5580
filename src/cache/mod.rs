//! Cache Module
//!
//! Provides the per-user point cache with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;
use crate::models::{Point, PointId, UserId};

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::{CacheCounters, CacheStats};
pub use store::InMemoryPointCache;

// == Public Constants ==
/// Maximum number of points a single user's entry may hold
pub const MAX_POINTS_PER_ENTRY: usize = 10_000;

/// Default number of cached users
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Longest entry TTL the cache accepts; larger values are clamped (100 years)
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Point Cache ==
/// Approximate, fast view of each user's points.
///
/// A missing or expired entry is reported as `Ok(None)`; errors are reserved
/// for the cache itself failing.
#[async_trait]
pub trait PointCache: Send + Sync {
    /// Returns the user's cached points if present and unexpired.
    async fn get(&self, user_id: UserId) -> CacheResult<Option<Vec<Point>>>;

    /// Replaces the user's entry wholesale and restarts its TTL.
    async fn put(&self, user_id: UserId, points: Vec<Point>) -> CacheResult<()>;

    /// Appends a point to the user's entry, creating a singleton entry if absent.
    async fn append(&self, user_id: UserId, point: Point) -> CacheResult<()>;

    /// Replaces the point with the same id in the user's entry, appending if
    /// it is not cached yet.
    async fn upsert(&self, user_id: UserId, point: Point) -> CacheResult<()>;

    /// Removes a point from the user's entry. No-op if not cached.
    async fn remove(&self, user_id: UserId, point_id: PointId) -> CacheResult<()>;

    /// Users with a live entry.
    async fn user_ids(&self) -> CacheResult<HashSet<UserId>>;
}
