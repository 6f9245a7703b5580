//! Notification Module
//!
//! Fire-and-forget delivery of point notifications between the creation path
//! and the statistics consumer.
//!
//! # Delivery
//! - At most once per subscriber; nothing is acknowledged to the publisher
//! - A subscriber that falls more than the channel capacity behind loses the
//!   oldest events
//! - Publishing to a topic nobody listens on fails and the event is dropped

mod bus;

use tokio::sync::broadcast;

use crate::error::PublishResult;
use crate::models::PointNotification;

pub use bus::NotificationBus;

/// Hands notifications to a topic without waiting for delivery.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, topic: &str, notification: PointNotification) -> PublishResult<()>;
}

/// Registers interest in a topic.
pub trait NotificationSubscriber: Send + Sync {
    fn subscribe(&self, topic: &str) -> broadcast::Receiver<PointNotification>;
}
