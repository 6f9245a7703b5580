//! Cache Entry Module
//!
//! Defines the per-user cache entry holding an ordered list of points with TTL.

use std::time::{Duration, Instant};

use crate::models::{Point, PointId};

// == Cache Entry ==
/// A user's cached points plus expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached points in insertion order
    pub points: Vec<Point>,
    /// Instant the entry stops being served
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(points: Vec<Point>, ttl: Duration) -> Self {
        Self {
            points,
            expires_at: expiry_after(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current instant reaches `expires_at`, so a
    /// zero TTL entry is never served.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Refresh ==
    /// Marks the entry as written now, restarting its TTL.
    pub fn refresh(&mut self, ttl: Duration) {
        self.expires_at = expiry_after(ttl);
    }

    // == Time To Live ==
    /// Returns the remaining TTL, zero once expired.
    #[cfg(test)]
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    // == Point Mutation ==
    /// Appends a point to the end of the entry.
    pub fn push(&mut self, point: Point, ttl: Duration) {
        self.points.push(point);
        self.refresh(ttl);
    }

    /// Replaces the point with the same id in place, appending when absent.
    pub fn upsert(&mut self, point: Point, ttl: Duration) {
        match self.points.iter_mut().find(|p| p.id == point.id) {
            Some(existing) => *existing = point,
            None => self.points.push(point),
        }
        self.refresh(ttl);
    }

    /// Removes the point with the given id.
    ///
    /// Returns true if a point was removed. The TTL restarts either way, the
    /// entry having been rewritten.
    pub fn remove(&mut self, point_id: PointId, ttl: Duration) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.id != point_id);
        self.refresh(ttl);
        self.points.len() != before
    }
}

/// Expiry instant `ttl` from now. A TTL past what `Instant` can represent
/// yields an entry that is already expired.
fn expiry_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or(now)
}
