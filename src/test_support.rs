//! Shared fixtures for unit tests

use chrono::Utc;
use uuid::Uuid;

use crate::hit_test::check_inside;
use crate::models::{Point, UserId};

/// A point owned by `owner` at the given coordinates.
pub fn point_at(owner: UserId, x: f64, y: f64, r: f64) -> Point {
    Point {
        id: Uuid::new_v4(),
        x,
        y,
        r,
        inside_area: check_inside(x, y, r),
        timestamp: Utc::now(),
        execution_time_ns: 0,
        owner_user_id: owner,
    }
}

/// A hit owned by `owner`.
pub fn point_for(owner: UserId) -> Point {
    point_at(owner, 1.0, 1.0, 1.0)
}

/// A miss owned by `owner`.
pub fn miss_for(owner: UserId) -> Point {
    point_at(owner, -1.0, -1.0, 1.0)
}
