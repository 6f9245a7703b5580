//! Cache Maintenance Task
//!
//! Background task that periodically removes expired cache entries and
//! reports cache metrics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::InMemoryPointCache;

/// Spawns a background task that cleans up expired entries and logs a cache
/// statistics snapshot on every run.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs.
///
/// # Arguments
/// * `cache` - Shared point cache
/// * `interval_secs` - Interval in seconds between runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(InMemoryPointCache::new(1000, Duration::from_secs(10)));
/// let maintenance_handle = spawn_cache_maintenance_task(cache.clone(), 1);
/// // Later, during shutdown:
/// maintenance_handle.abort();
/// ```
pub fn spawn_cache_maintenance_task(
    cache: Arc<InMemoryPointCache>,
    interval_secs: u64,
) -> JoinHandle<()> {
    spawn_with_interval(cache, Duration::from_secs(interval_secs.max(1)))
}

fn spawn_with_interval(cache: Arc<InMemoryPointCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();
            let stats = cache.stats();

            if removed > 0 {
                info!("Cache maintenance: removed {} expired entries", removed);
            }
            debug!(
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                miss_rate = stats.miss_rate(),
                evictions = stats.evictions,
                entries = stats.total_entries,
                "Cache metrics"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::point_for;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_maintenance_removes_expired_entries() {
        let cache = Arc::new(InMemoryPointCache::new(100, Duration::from_millis(50)));
        let user = Uuid::new_v4();
        cache.put_points(user, vec![point_for(user)]).unwrap();

        let handle = spawn_with_interval(cache.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(cache.is_empty(), "Expired entry should have been cleaned up");
        handle.abort();
    }

    #[tokio::test]
    async fn test_maintenance_preserves_live_entries() {
        let cache = Arc::new(InMemoryPointCache::new(100, Duration::from_secs(3600)));
        let user = Uuid::new_v4();
        cache.put_points(user, vec![point_for(user)]).unwrap();

        let handle = spawn_with_interval(cache.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_points(user).is_some(), "Live entry should not be removed");
        handle.abort();
    }

    #[tokio::test]
    async fn test_maintenance_can_be_aborted() {
        let cache = Arc::new(InMemoryPointCache::new(100, Duration::from_secs(10)));

        let handle = spawn_cache_maintenance_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
