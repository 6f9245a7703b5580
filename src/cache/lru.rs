//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{HashMap, VecDeque};

use crate::models::UserId;

/// Stale slots tolerated in the queue before it is compacted.
const COMPACTION_SLACK: usize = 32;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch pushes a `(key, stamp)` slot onto the back of a queue and
/// records the stamp as the key's latest. Slots whose stamp is no longer the
/// latest are stale and skipped on eviction, so touch, remove and evict are
/// all O(1) amortized.
/// - Front = Least recently used
/// - Back = Most recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Access slots, oldest first
    order: VecDeque<(UserId, u64)>,
    /// Latest stamp per tracked key
    latest: HashMap<UserId, u64>,
    /// Monotonic access counter
    stamp: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as recently used.
    pub fn touch(&mut self, key: UserId) {
        self.stamp += 1;
        self.latest.insert(key, self.stamp);
        self.order.push_back((key, self.stamp));
        self.maybe_compact();
    }

    // == Remove ==
    /// Stops tracking a key. Its queued slots become stale.
    pub fn remove(&mut self, key: &UserId) {
        if self.latest.remove(key).is_some() {
            self.maybe_compact();
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<UserId> {
        while let Some((key, stamp)) = self.order.pop_front() {
            if self.latest.get(&key) == Some(&stamp) {
                self.latest.remove(&key);
                return Some(key);
            }
        }
        None
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&mut self) -> Option<UserId> {
        while let Some(&(key, stamp)) = self.order.front() {
            if self.latest.get(&key) == Some(&stamp) {
                return Some(key);
            }
            self.order.pop_front();
        }
        None
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[cfg(test)]
    pub fn contains(&self, key: &UserId) -> bool {
        self.latest.contains_key(key)
    }

    fn maybe_compact(&mut self) {
        if self.order.len() > 2 * self.latest.len() + COMPACTION_SLACK {
            let latest = &self.latest;
            self.order
                .retain(|(key, stamp)| latest.get(key) == Some(stamp));
        }
    }
}
