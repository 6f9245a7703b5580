//! Point Cache Store Module
//!
//! Main cache engine combining a sharded map of per-user entries with LRU
//! tracking and TTL expiration.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{
    CacheCounters, CacheEntry, CacheStats, LruTracker, PointCache, MAX_ENTRY_TTL,
    MAX_POINTS_PER_ENTRY,
};
use crate::error::{CacheError, CacheResult};
use crate::models::{Point, PointId, UserId};

// == In-Memory Point Cache ==
/// Bounded, time-expiring cache of each user's points.
///
/// Entries live in a `DashMap`, so operations on different users only contend
/// when they hash to the same shard. The LRU order sits behind a mutex that is
/// taken unconditionally only when a new entry is admitted; other accesses
/// record recency with `try_lock` and skip the update under contention.
///
/// Lock order is always LRU mutex before map shard. No shard guard is held
/// while blocking on the mutex.
#[derive(Debug)]
pub struct InMemoryPointCache {
    /// Per-user entries
    entries: DashMap<UserId, CacheEntry>,
    /// LRU access tracker
    lru: Mutex<LruTracker>,
    /// Performance counters
    counters: CacheCounters,
    /// Maximum number of cached users
    max_entries: usize,
    /// Lifetime of an entry after its last write
    ttl: Duration,
}

impl InMemoryPointCache {
    // == Constructor ==
    /// Creates a new cache with the given capacity and entry TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of users the cache can hold
    /// * `ttl` - Time an entry stays live after its last write, at most
    ///   `MAX_ENTRY_TTL`
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let ttl = if ttl > MAX_ENTRY_TTL {
            warn!(
                requested = ?ttl,
                "Cache TTL too large, clamping to {:?}",
                MAX_ENTRY_TTL
            );
            MAX_ENTRY_TTL
        } else {
            ttl
        };

        Self {
            entries: DashMap::new(),
            lru: Mutex::new(LruTracker::new()),
            counters: CacheCounters::new(),
            max_entries,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get ==
    /// Returns the user's points if the entry is live.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get_points(&self, user_id: UserId) -> Option<Vec<Point>> {
        let lookup = self.entries.get(&user_id).map(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.points.clone())
            }
        });

        match lookup {
            Some(Some(points)) => {
                self.counters.record_hit();
                self.record_access(user_id);
                Some(points)
            }
            Some(None) => {
                self.expire(user_id);
                self.counters.record_miss();
                None
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Replaces the user's entry and restarts its TTL.
    ///
    /// If the user is not cached and the cache is at capacity, the least
    /// recently used entry is evicted.
    pub fn put_points(&self, user_id: UserId, points: Vec<Point>) -> CacheResult<()> {
        self.check_size(user_id, points.len())?;

        if let Some(mut entry) = self.entries.get_mut(&user_id) {
            *entry = CacheEntry::new(points, self.ttl);
            drop(entry);
            self.record_access(user_id);
            return Ok(());
        }

        self.insert_fresh(user_id, points)
    }

    // == Append ==
    /// Appends a point to the user's live entry, or starts a singleton entry.
    pub fn append_point(&self, user_id: UserId, point: Point) -> CacheResult<()> {
        if let Some(mut entry) = self.entries.get_mut(&user_id) {
            if !entry.is_expired() {
                self.check_size(user_id, entry.points.len() + 1)?;
                entry.push(point, self.ttl);
                drop(entry);
                self.record_access(user_id);
                return Ok(());
            }
        }

        self.insert_fresh(user_id, vec![point])
    }

    // == Upsert ==
    /// Replaces the cached point with the same id, appending when absent.
    pub fn upsert_point(&self, user_id: UserId, point: Point) -> CacheResult<()> {
        if let Some(mut entry) = self.entries.get_mut(&user_id) {
            if !entry.is_expired() {
                let grows = !entry.points.iter().any(|p| p.id == point.id);
                if grows {
                    self.check_size(user_id, entry.points.len() + 1)?;
                }
                entry.upsert(point, self.ttl);
                drop(entry);
                self.record_access(user_id);
                return Ok(());
            }
        }

        self.insert_fresh(user_id, vec![point])
    }

    // == Remove ==
    /// Removes a point from the user's live entry.
    ///
    /// Returns true if the point was cached.
    pub fn remove_point(&self, user_id: UserId, point_id: PointId) -> bool {
        let removed = match self.entries.get_mut(&user_id) {
            Some(mut entry) if !entry.is_expired() => Some(entry.remove(point_id, self.ttl)),
            Some(_) => None,
            None => return false,
        };

        match removed {
            Some(removed) => {
                self.record_access(user_id);
                removed
            }
            None => {
                self.expire(user_id);
                false
            }
        }
    }

    // == Cached Users ==
    /// Returns the users that currently have a live entry.
    pub fn cached_user_ids(&self) -> HashSet<UserId> {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .map(|entry| *entry.key())
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut expired = Vec::new();
        self.entries.retain(|user_id, entry| {
            if entry.is_expired() {
                expired.push(*user_id);
                false
            } else {
                true
            }
        });

        if !expired.is_empty() {
            let mut lru = self.lru.lock();
            for user_id in &expired {
                // re-admitted meanwhile
                if !self.entries.contains_key(user_id) {
                    lru.remove(user_id);
                }
            }
        }

        expired.len()
    }

    // == Length ==
    /// Returns the number of entries, expired ones included until cleaned up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_size(&self, user_id: UserId, len: usize) -> CacheResult<()> {
        if len > MAX_POINTS_PER_ENTRY {
            return Err(CacheError::EntryTooLarge { user_id, len });
        }
        Ok(())
    }

    /// Admits a new entry for `user_id`, evicting LRU entries to make room.
    fn insert_fresh(&self, user_id: UserId, points: Vec<Point>) -> CacheResult<()> {
        self.check_size(user_id, points.len())?;

        let mut lru = self.lru.lock();
        if !self.entries.contains_key(&user_id) {
            while self.entries.len() >= self.max_entries {
                let victim = lru.evict_oldest().ok_or_else(|| {
                    CacheError::CacheFull(format!(
                        "no evictable entry among {} cached users",
                        self.entries.len()
                    ))
                })?;
                if self.entries.remove(&victim).is_some() {
                    self.counters.record_eviction();
                    debug!(user_id = %victim, "Evicted least recently used cache entry");
                }
            }
        }

        self.entries.insert(user_id, CacheEntry::new(points, self.ttl));
        lru.touch(user_id);
        Ok(())
    }

    /// Drops the user's entry if it is expired.
    fn expire(&self, user_id: UserId) {
        if self
            .entries
            .remove_if(&user_id, |_, entry| entry.is_expired())
            .is_some()
        {
            let mut lru = self.lru.lock();
            if !self.entries.contains_key(&user_id) {
                lru.remove(&user_id);
            }
        }
    }

    /// Lossy recency update: skipped when the LRU mutex is busy.
    fn record_access(&self, user_id: UserId) {
        if let Some(mut lru) = self.lru.try_lock() {
            if self.entries.contains_key(&user_id) {
                lru.touch(user_id);
            }
        }
    }
}

#[async_trait]
impl PointCache for InMemoryPointCache {
    async fn get(&self, user_id: UserId) -> CacheResult<Option<Vec<Point>>> {
        Ok(self.get_points(user_id))
    }

    async fn put(&self, user_id: UserId, points: Vec<Point>) -> CacheResult<()> {
        self.put_points(user_id, points)
    }

    async fn append(&self, user_id: UserId, point: Point) -> CacheResult<()> {
        self.append_point(user_id, point)
    }

    async fn upsert(&self, user_id: UserId, point: Point) -> CacheResult<()> {
        self.upsert_point(user_id, point)
    }

    async fn remove(&self, user_id: UserId, point_id: PointId) -> CacheResult<()> {
        self.remove_point(user_id, point_id);
        Ok(())
    }

    async fn user_ids(&self) -> CacheResult<HashSet<UserId>> {
        Ok(self.cached_user_ids())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::point_for;
    use std::sync::Arc;
    use std::thread::sleep;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    fn cache() -> InMemoryPointCache {
        InMemoryPointCache::new(100, Duration::from_secs(300))
    }

    #[test]
    fn test_cache_new() {
        let cache = cache();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(cache.cached_user_ids().is_empty());
    }

    #[test]
    fn test_put_and_get_preserves_order() {
        let cache = cache();
        let user = Uuid::new_v4();
        let points = vec![point_for(user), point_for(user), point_for(user)];

        cache.put_points(user, points.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(points));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_uncached_user_is_miss() {
        let cache = cache();
        assert_eq!(cache.get_points(Uuid::new_v4()), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = cache();
        let user = Uuid::new_v4();

        cache.put_points(user, vec![point_for(user)]).unwrap();
        let replacement = vec![point_for(user), point_for(user)];
        cache.put_points(user, replacement.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(replacement));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_append_creates_singleton() {
        let cache = cache();
        let user = Uuid::new_v4();
        let point = point_for(user);

        cache.append_point(user, point.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(vec![point]));
    }

    #[test]
    fn test_append_extends_existing_entry() {
        let cache = cache();
        let user = Uuid::new_v4();
        let first = point_for(user);
        let second = point_for(user);

        cache.put_points(user, vec![first.clone()]).unwrap();
        cache.append_point(user, second.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(vec![first, second]));
    }

    #[test]
    fn test_append_to_expired_entry_starts_over() {
        let cache = InMemoryPointCache::new(10, Duration::from_millis(50));
        let user = Uuid::new_v4();
        let stale = point_for(user);
        let fresh = point_for(user);

        cache.put_points(user, vec![stale]).unwrap();
        sleep(Duration::from_millis(80));
        cache.append_point(user, fresh.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(vec![fresh]));
    }

    #[test]
    fn test_upsert_replaces_cached_point() {
        let cache = cache();
        let user = Uuid::new_v4();
        let original = point_for(user);
        cache.put_points(user, vec![original.clone()]).unwrap();

        let mut updated = original.clone();
        updated.x = 42.0;
        cache.upsert_point(user, updated.clone()).unwrap();

        assert_eq!(cache.get_points(user), Some(vec![updated]));
    }

    #[test]
    fn test_remove_point() {
        let cache = cache();
        let user = Uuid::new_v4();
        let keep = point_for(user);
        let drop_me = point_for(user);
        cache
            .put_points(user, vec![keep.clone(), drop_me.clone()])
            .unwrap();

        assert!(cache.remove_point(user, drop_me.id));
        assert_eq!(cache.get_points(user), Some(vec![keep]));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let cache = cache();
        let user = Uuid::new_v4();
        let point = point_for(user);

        assert!(!cache.remove_point(user, point.id));
        assert!(cache.is_empty());

        cache.put_points(user, vec![point.clone()]).unwrap();
        assert!(!cache.remove_point(user, Uuid::new_v4()));
        assert_eq!(cache.get_points(user), Some(vec![point]));
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let cache = InMemoryPointCache::new(10, Duration::from_secs(u64::MAX));
        let user = Uuid::new_v4();
        let point = point_for(user);

        assert_eq!(cache.ttl(), MAX_ENTRY_TTL);
        assert_ok!(cache.put_points(user, Vec::new()));
        assert_ok!(cache.append_point(user, point.clone()));
        assert_ok!(cache.upsert_point(user, point.clone()));

        assert_eq!(cache.get_points(user), Some(vec![point]));
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = InMemoryPointCache::new(10, Duration::from_millis(50));
        let user = Uuid::new_v4();

        cache.put_points(user, vec![point_for(user)]).unwrap();
        assert!(cache.get_points(user).is_some());

        sleep(Duration::from_millis(80));

        assert_eq!(cache.get_points(user), None);
        assert!(cache.is_empty(), "expired entry is dropped on read");
        assert!(!cache.cached_user_ids().contains(&user));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = InMemoryPointCache::new(3, Duration::from_secs(300));
        let users: Vec<_> = (0..4).map(|_| Uuid::new_v4()).collect();

        for user in &users[..3] {
            cache.put_points(*user, vec![point_for(*user)]).unwrap();
        }
        // Cache is full, admitting users[3] evicts users[0]
        cache.put_points(users[3], vec![point_for(users[3])]).unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_points(users[0]), None);
        assert!(cache.get_points(users[1]).is_some());
        assert!(cache.get_points(users[2]).is_some());
        assert!(cache.get_points(users[3]).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_touch_on_get() {
        let cache = InMemoryPointCache::new(3, Duration::from_secs(300));
        let users: Vec<_> = (0..4).map(|_| Uuid::new_v4()).collect();

        for user in &users[..3] {
            cache.put_points(*user, vec![point_for(*user)]).unwrap();
        }
        // users[0] becomes most recently used
        cache.get_points(users[0]).unwrap();

        cache.append_point(users[3], point_for(users[3])).unwrap();

        assert!(cache.get_points(users[0]).is_some());
        assert_eq!(cache.get_points(users[1]), None);
    }

    #[test]
    fn test_zero_capacity_rejects_writes() {
        let cache = InMemoryPointCache::new(0, Duration::from_secs(300));
        let user = Uuid::new_v4();

        let result = cache.put_points(user, vec![point_for(user)]);
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
    }

    #[test]
    fn test_entry_too_large() {
        let cache = cache();
        let user = Uuid::new_v4();
        let points = vec![point_for(user); MAX_POINTS_PER_ENTRY + 1];

        let result = cache.put_points(user, points);
        assert!(matches!(
            result,
            Err(CacheError::EntryTooLarge { len, .. }) if len == MAX_POINTS_PER_ENTRY + 1
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let cache = cache();
        let user = Uuid::new_v4();

        cache.put_points(user, vec![point_for(user)]).unwrap();
        cache.get_points(user).unwrap(); // hit
        let _ = cache.get_points(Uuid::new_v4()); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = InMemoryPointCache::new(10, Duration::from_millis(50));
        let old = Uuid::new_v4();
        let young = Uuid::new_v4();

        cache.put_points(old, vec![point_for(old)]).unwrap();
        sleep(Duration::from_millis(80));
        cache.put_points(young, vec![point_for(young)]).unwrap();

        let removed = cache.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_points(young).is_some());
    }

    #[test]
    fn test_concurrent_writers_respect_capacity() {
        let cache = Arc::new(InMemoryPointCache::new(16, Duration::from_secs(300)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let user = Uuid::new_v4();
                        cache.append_point(user, point_for(user)).unwrap();
                        let _ = cache.get_points(user);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 16);
        assert_eq!(cache.stats().evictions, 800 - cache.len() as u64);
    }

    #[tokio::test]
    async fn test_trait_round_trip() {
        let cache: Arc<dyn PointCache> = Arc::new(cache());
        let user = Uuid::new_v4();
        let point = point_for(user);

        cache.append(user, point.clone()).await.unwrap();
        assert_eq!(cache.get(user).await.unwrap(), Some(vec![point.clone()]));
        assert_eq!(cache.user_ids().await.unwrap(), HashSet::from([user]));

        cache.remove(user, point.id).await.unwrap();
        assert_eq!(cache.get(user).await.unwrap(), Some(Vec::new()));
    }
}
