//! Cache-fronted point service
//!
//! The cache is an optimization and never the source of truth: every cache
//! failure degrades to store-backed behavior and is only visible in the logs.
//!
//! # Side effects of `create`
//! The cache append and the notification publish run as detached tasks after
//! the stored point is known. They are not awaited, not cancellable and not
//! retried; a failure is logged and dropped.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::cache::PointCache;
use crate::error::Result;
use crate::models::{
    Point, PointId, PointNotification, PointRequest, PointUpdate, Principal, UserId,
};
use crate::notify::NotificationPublisher;
use crate::service::PointService;

/// `PointService` decorator adding read-through caching, best-effort cache
/// writes and creation notifications.
#[derive(Clone)]
pub struct CachedPointService {
    inner: Arc<dyn PointService>,
    cache: Arc<dyn PointCache>,
    publisher: Arc<dyn NotificationPublisher>,
    topic: String,
}

impl CachedPointService {
    /// Wraps `inner`, publishing creation events on `topic`.
    pub fn new(
        inner: Arc<dyn PointService>,
        cache: Arc<dyn PointCache>,
        publisher: Arc<dyn NotificationPublisher>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            cache,
            publisher,
            topic: topic.into(),
        }
    }

    fn spawn_cache_append(&self, user_id: UserId, point: Point) {
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            let point_id = point.id;
            if let Err(err) = cache.append(user_id, point).await {
                error!(%user_id, %point_id, error = %err, "Failed to update cache");
            }
        });
    }

    fn spawn_publish(&self, notification: PointNotification) {
        let publisher = Arc::clone(&self.publisher);
        let topic = self.topic.clone();
        tokio::spawn(async move {
            let user_id = notification.user_id;
            if let Err(err) = publisher.publish(&topic, notification) {
                warn!(%topic, %user_id, error = %err, "Point notification dropped");
            }
        });
    }
}

#[async_trait]
impl PointService for CachedPointService {
    async fn list_all(&self) -> Result<Vec<Point>> {
        let cached_user_ids = match self.cache.user_ids().await {
            Ok(ids) => ids,
            Err(err) => {
                error!(error = %err, "Cache error, listing all points from store");
                return self.inner.list_all().await;
            }
        };

        if cached_user_ids.is_empty() {
            return self.inner.list_all().await;
        }

        match self.inner.list_for_owners(&cached_user_ids).await {
            Ok(points) if !points.is_empty() => Ok(points),
            Ok(_) => self.inner.list_all().await,
            Err(err) => {
                error!(error = %err, "Cached-owner query failed, listing all points from store");
                self.inner.list_all().await
            }
        }
    }

    async fn list_for_owners(&self, user_ids: &HashSet<UserId>) -> Result<Vec<Point>> {
        self.inner.list_for_owners(user_ids).await
    }

    async fn list_mine(&self, user_id: UserId) -> Result<Vec<Point>> {
        match self.cache.get(user_id).await {
            Ok(Some(points)) => {
                debug!(%user_id, count = points.len(), "Points served from cache");
                Ok(points)
            }
            Ok(None) => {
                let points = self.inner.list_mine(user_id).await?;
                if let Err(err) = self.cache.put(user_id, points.clone()).await {
                    warn!(%user_id, error = %err, "Failed to write points back to cache");
                }
                Ok(points)
            }
            Err(err) => {
                error!(%user_id, error = %err, "Cache error, reading points from store");
                self.inner.list_mine(user_id).await
            }
        }
    }

    async fn create(&self, principal: &Principal, request: PointRequest) -> Result<Point> {
        let point = self.inner.create(principal, request).await?;

        self.spawn_cache_append(principal.user_id, point.clone());
        self.spawn_publish(PointNotification::new(principal.user_id, point.clone()));

        Ok(point)
    }

    async fn update(&self, id: PointId, update: PointUpdate) -> Result<Point> {
        let updated = self.inner.update(id, update).await?;

        if let Err(err) = self.cache.upsert(updated.owner_user_id, updated.clone()).await {
            error!(point_id = %id, error = %err, "Failed to update cache for point");
        }
        Ok(updated)
    }

    async fn delete(&self, id: PointId) -> Result<Point> {
        let deleted = self.inner.delete(id).await?;

        if let Err(err) = self.cache.remove(deleted.owner_user_id, id).await {
            error!(point_id = %id, error = %err, "Failed to remove point from cache");
        }
        Ok(deleted)
    }
}
