//! Data models for points, requests and notifications
//!
//! Points are referenced by value everywhere: the store owns them, the cache
//! and notifications carry clones.

pub mod notification;
pub mod point;
pub mod requests;

// Re-export commonly used types
pub use notification::PointNotification;
pub use point::{Point, PointId, Principal, UserId};
pub use requests::{PointRequest, PointUpdate};
