//! Point Store Module
//!
//! Durable storage for points is an external collaborator. This module defines
//! the interface the service consumes and an in-memory implementation.

mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Point, PointId, UserId};

pub use memory::InMemoryPointStore;

/// Storage for point records, keyed by point id and by owner.
///
/// Listing operations return points in insertion order.
#[async_trait]
pub trait PointStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Point>>;

    async fn find_by_owner(&self, user_id: UserId) -> StoreResult<Vec<Point>>;

    /// Points owned by any of the given users.
    async fn find_by_owners(&self, user_ids: &HashSet<UserId>) -> StoreResult<Vec<Point>>;

    /// Fails with `StoreError::NotFound` for an unknown id.
    async fn find_by_id(&self, id: PointId) -> StoreResult<Point>;

    /// Inserts or replaces the point, returning the stored value.
    async fn save(&self, point: Point) -> StoreResult<Point>;

    /// Fails with `StoreError::NotFound` for an unknown id.
    async fn delete_by_id(&self, id: PointId) -> StoreResult<()>;
}
