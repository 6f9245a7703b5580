//! Notification History
//!
//! Keeps the most recent point notifications seen by the statistics consumer.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::models::PointNotification;

/// Bounded FIFO log of consumed notifications; the oldest entry is dropped
/// once `limit` is reached.
#[derive(Debug)]
pub struct NotificationHistory {
    entries: Mutex<VecDeque<PointNotification>>,
    limit: usize,
}

impl NotificationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(limit.min(1024))),
            limit,
        }
    }

    pub fn record(&self, notification: PointNotification) {
        if self.limit == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        if entries.len() == self.limit {
            entries.pop_front();
        }
        entries.push_back(notification);
    }

    /// All kept notifications, oldest first.
    pub fn all(&self) -> Vec<PointNotification> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
