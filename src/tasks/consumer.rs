//! Statistics Consumer Task
//!
//! Drains a point notification subscription into the miss streak tracker and
//! the notification history.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::PointNotification;
use crate::statistics::{MissStreakTracker, NotificationHistory};

/// Spawns the consumer loop for `receiver`.
///
/// Lagged notifications are lost and only logged. The task ends when every
/// sender of the topic has been dropped.
pub fn spawn_statistics_consumer(
    mut receiver: broadcast::Receiver<PointNotification>,
    tracker: Arc<MissStreakTracker>,
    history: Arc<NotificationHistory>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Statistics consumer started");

        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    tracker.record(&notification);
                    history.record(notification);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Statistics consumer lagged, notifications lost");
                }
                Err(RecvError::Closed) => {
                    info!("Notification channel closed, statistics consumer stopping");
                    break;
                }
            }
        }
    })
}
