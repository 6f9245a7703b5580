//! Store-backed point service

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{PointError, Result};
use crate::hit_test::check_inside;
use crate::models::{Point, PointId, PointRequest, PointUpdate, Principal, UserId};
use crate::service::PointService;
use crate::store::PointStore;

/// `PointService` that goes straight to the store.
///
/// The hit test, timestamp and execution time are computed here, once, when a
/// point is created.
#[derive(Clone)]
pub struct StorePointService {
    store: Arc<dyn PointStore>,
}

impl StorePointService {
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PointService for StorePointService {
    async fn list_all(&self) -> Result<Vec<Point>> {
        Ok(self.store.find_all().await?)
    }

    async fn list_for_owners(&self, user_ids: &HashSet<UserId>) -> Result<Vec<Point>> {
        Ok(self.store.find_by_owners(user_ids).await?)
    }

    async fn list_mine(&self, user_id: UserId) -> Result<Vec<Point>> {
        Ok(self.store.find_by_owner(user_id).await?)
    }

    async fn create(&self, principal: &Principal, request: PointRequest) -> Result<Point> {
        if let Some(msg) = request.validate() {
            return Err(PointError::InvalidRequest(msg));
        }

        let started = Instant::now();
        let inside_area = check_inside(request.x, request.y, request.r);
        let point = Point {
            id: Uuid::new_v4(),
            x: request.x,
            y: request.y,
            r: request.r,
            inside_area,
            timestamp: Utc::now(),
            execution_time_ns: started.elapsed().as_nanos() as u64,
            owner_user_id: principal.user_id,
        };

        let saved = self.store.save(point).await?;
        debug!(point_id = %saved.id, user = %principal.username, inside = saved.inside_area, "Point created");
        Ok(saved)
    }

    async fn update(&self, id: PointId, update: PointUpdate) -> Result<Point> {
        if let Some(msg) = update.validate() {
            return Err(PointError::InvalidRequest(msg));
        }

        let mut point = self.store.find_by_id(id).await?;
        point.x = update.x;
        point.y = update.y;
        point.r = update.r;
        point.inside_area = update.inside_area;
        Ok(self.store.save(point).await?)
    }

    async fn delete(&self, id: PointId) -> Result<Point> {
        let point = self.store.find_by_id(id).await?;
        self.store.delete_by_id(id).await?;
        Ok(point)
    }
}
