//! Application State
//!
//! Owns every shared service object and wires the point service stack.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cache::{InMemoryPointCache, PointCache};
use crate::config::Config;
use crate::notify::{NotificationBus, NotificationPublisher, NotificationSubscriber};
use crate::service::{CachedPointService, PointService, StorePointService};
use crate::statistics::{MissStreakTracker, NotificationHistory};
use crate::store::{InMemoryPointStore, PointStore};
use crate::tasks::{spawn_cache_maintenance_task, spawn_statistics_consumer};

/// Shared application state.
///
/// Cloning is cheap: every component is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryPointStore>,
    pub cache: Arc<InMemoryPointCache>,
    pub bus: Arc<NotificationBus>,
    pub statistics: Arc<MissStreakTracker>,
    pub notifications: Arc<NotificationHistory>,
    /// Cached point service over the store-backed one
    pub points: Arc<dyn PointService>,
    pub topic: String,
}

impl AppState {
    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(InMemoryPointStore::new());
        let cache = Arc::new(InMemoryPointCache::new(
            config.cache_max_entries,
            config.cache_ttl(),
        ));
        let bus = Arc::new(NotificationBus::new(config.notification_channel_capacity));

        let base: Arc<dyn PointService> =
            Arc::new(StorePointService::new(store.clone() as Arc<dyn PointStore>));
        let points: Arc<dyn PointService> = Arc::new(CachedPointService::new(
            base,
            cache.clone() as Arc<dyn PointCache>,
            bus.clone() as Arc<dyn NotificationPublisher>,
            config.notification_topic.clone(),
        ));

        Self {
            store,
            cache,
            bus,
            statistics: Arc::new(MissStreakTracker::new(config.miss_threshold)),
            notifications: Arc::new(NotificationHistory::new(
                config.notification_history_limit,
            )),
            points,
            topic: config.notification_topic.clone(),
        }
    }

    /// Subscribes the statistics consumer to the notification topic and starts it.
    ///
    /// Must run before points are created: notifications published while the
    /// topic has no subscriber are dropped.
    pub fn start_statistics_consumer(&self) -> JoinHandle<()> {
        spawn_statistics_consumer(
            self.bus.subscribe(&self.topic),
            self.statistics.clone(),
            self.notifications.clone(),
        )
    }

    pub fn start_cache_maintenance(&self, interval_secs: u64) -> JoinHandle<()> {
        spawn_cache_maintenance_task(self.cache.clone(), interval_secs)
    }
}
