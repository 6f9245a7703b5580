//! Point notification event

use serde::{Deserialize, Serialize};

use super::point::{Point, UserId};

/// Emitted once per successfully created point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointNotification {
    pub user_id: UserId,
    pub point: Point,
}

impl PointNotification {
    pub fn new(user_id: UserId, point: Point) -> Self {
        Self { user_id, point }
    }

    /// Whether the carried point hit the area.
    pub fn is_hit(&self) -> bool {
        self.point.inside_area
    }
}
