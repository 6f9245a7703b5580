//! In-memory point store

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{StoreError, StoreResult};
use crate::models::{Point, PointId, UserId};
use crate::store::PointStore;

#[derive(Debug, Clone)]
struct StoredPoint {
    /// Insertion sequence, kept across replacements
    seq: u64,
    point: Point,
}

/// Process-local `PointStore` backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryPointStore {
    points: DashMap<PointId, StoredPoint>,
    next_seq: AtomicU64,
}

impl InMemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn collect_where<F>(&self, keep: F) -> Vec<Point>
    where
        F: Fn(&Point) -> bool,
    {
        let mut matching: Vec<StoredPoint> = self
            .points
            .iter()
            .filter(|entry| keep(&entry.value().point))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by_key(|stored| stored.seq);
        matching.into_iter().map(|stored| stored.point).collect()
    }
}

#[async_trait]
impl PointStore for InMemoryPointStore {
    async fn find_all(&self) -> StoreResult<Vec<Point>> {
        Ok(self.collect_where(|_| true))
    }

    async fn find_by_owner(&self, user_id: UserId) -> StoreResult<Vec<Point>> {
        Ok(self.collect_where(|point| point.owner_user_id == user_id))
    }

    async fn find_by_owners(&self, user_ids: &HashSet<UserId>) -> StoreResult<Vec<Point>> {
        Ok(self.collect_where(|point| user_ids.contains(&point.owner_user_id)))
    }

    async fn find_by_id(&self, id: PointId) -> StoreResult<Point> {
        self.points
            .get(&id)
            .map(|entry| entry.point.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, point: Point) -> StoreResult<Point> {
        let id = point.id;
        self.points
            .entry(id)
            .and_modify(|stored| stored.point = point.clone())
            .or_insert_with(|| StoredPoint {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                point: point.clone(),
            });
        Ok(point)
    }

    async fn delete_by_id(&self, id: PointId) -> StoreResult<()> {
        self.points
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
