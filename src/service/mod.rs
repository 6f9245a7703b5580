//! Point Service Module
//!
//! `StorePointService` talks to the store directly. `CachedPointService`
//! decorates any `PointService` with the point cache and notification
//! publishing, keeping the same contract.

mod base;
mod cached;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Point, PointId, PointRequest, PointUpdate, Principal, UserId};

pub use base::StorePointService;
pub use cached::CachedPointService;

/// Point reads and writes. Errors come from the store only.
#[async_trait]
pub trait PointService: Send + Sync {
    /// Every point.
    async fn list_all(&self) -> Result<Vec<Point>>;

    /// Points owned by the given users.
    async fn list_for_owners(&self, user_ids: &HashSet<UserId>) -> Result<Vec<Point>>;

    /// Points owned by one user.
    async fn list_mine(&self, user_id: UserId) -> Result<Vec<Point>>;

    /// Evaluates and stores a new point owned by `principal`.
    async fn create(&self, principal: &Principal, request: PointRequest) -> Result<Point>;

    /// Overwrites the coordinates and hit flag of an existing point.
    async fn update(&self, id: PointId, update: PointUpdate) -> Result<Point>;

    /// Deletes a point, returning its last stored value.
    async fn delete(&self, id: PointId) -> Result<Point>;
}
