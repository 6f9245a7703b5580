//! Topic-keyed broadcast bus

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{PublishError, PublishResult};
use crate::models::PointNotification;
use crate::notify::{NotificationPublisher, NotificationSubscriber};

/// One bounded `broadcast` channel per topic, created on first subscription.
#[derive(Debug)]
pub struct NotificationBus {
    channels: DashMap<String, broadcast::Sender<PointNotification>>,
    capacity: usize,
    closed: AtomicBool,
}

impl NotificationBus {
    /// Creates a bus whose topics buffer up to `capacity` notifications.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of live subscribers on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drops every topic sender. Subscribers drain what is buffered and then
    /// observe the channel as closed. Later publishes fail with
    /// `PublishError::Closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.channels.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl NotificationPublisher for NotificationBus {
    fn publish(&self, topic: &str, notification: PointNotification) -> PublishResult<()> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }

        let sender = self
            .channels
            .get(topic)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PublishError::NoSubscribers(topic.to_string()))?;

        let receivers = sender
            .send(notification)
            .map_err(|_| PublishError::NoSubscribers(topic.to_string()))?;
        debug!(topic, receivers, "Point notification published");
        Ok(())
    }
}

impl NotificationSubscriber for NotificationBus {
    fn subscribe(&self, topic: &str) -> broadcast::Receiver<PointNotification> {
        if self.is_closed() {
            // Sender dropped on return, so the receiver reports Closed at once
            return broadcast::channel(1).1;
        }

        self.channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::point_for;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    const TOPIC: &str = "user.notifications.point";

    fn notification() -> PointNotification {
        let user = Uuid::new_v4();
        PointNotification::new(user, point_for(user))
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = NotificationBus::new(16);
        let mut first = bus.subscribe(TOPIC);
        let mut second = bus.subscribe(TOPIC);
        let event = notification();

        assert_ok!(bus.publish(TOPIC, event.clone()));

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
        assert_eq!(bus.subscriber_count(TOPIC), 2);
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let bus = NotificationBus::new(16);

        let result = bus.publish(TOPIC, notification());
        assert_eq!(result, Err(PublishError::NoSubscribers(TOPIC.to_string())));

        // topic exists but its only subscriber went away
        drop(bus.subscribe(TOPIC));
        assert_err!(bus.publish(TOPIC, notification()));
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = NotificationBus::new(16);
        let mut other = bus.subscribe("other.topic");
        let _points = bus.subscribe(TOPIC);

        assert_ok!(bus.publish(TOPIC, notification()));

        assert_eq!(other.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_loses_oldest() {
        let bus = NotificationBus::new(2);
        let mut receiver = bus.subscribe(TOPIC);
        let events: Vec<_> = (0..3).map(|_| notification()).collect();

        for event in &events {
            assert_ok!(bus.publish(TOPIC, event.clone()));
        }

        assert_eq!(receiver.recv().await, Err(RecvError::Lagged(1)));
        assert_eq!(receiver.recv().await.unwrap(), events[1]);
        assert_eq!(receiver.recv().await.unwrap(), events[2]);
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions() {
        let bus = NotificationBus::new(4);
        let mut receiver = bus.subscribe(TOPIC);

        bus.close();

        assert_eq!(receiver.recv().await, Err(RecvError::Closed));
    }

    #[tokio::test]
    async fn test_closed_bus_rejects_publish() {
        let bus = NotificationBus::new(4);
        let _receiver = bus.subscribe(TOPIC);

        bus.close();

        assert!(bus.is_closed());
        assert_eq!(
            bus.publish(TOPIC, notification()),
            Err(PublishError::Closed)
        );

        let mut late = bus.subscribe(TOPIC);
        assert_eq!(late.recv().await, Err(RecvError::Closed));
        assert_eq!(bus.subscriber_count(TOPIC), 0);
    }
}
