//! Point and principal models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored point.
pub type PointId = Uuid;

/// Identifier of a user owning points.
pub type UserId = Uuid;

/// A submitted hit-test sample.
///
/// `inside_area` is fixed when the point is created and is never recomputed
/// from `x`, `y` and `r` afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub inside_area: bool,
    pub timestamp: DateTime<Utc>,
    /// Nanoseconds spent evaluating the point at creation
    pub execution_time_ns: u64,
    pub owner_user_id: UserId,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
