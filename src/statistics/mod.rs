//! Statistics Module
//!
//! Consumer-side bookkeeping for point notifications: per-user miss streaks
//! with alerting, and a bounded history of what was consumed.

mod history;
mod tracker;

pub use history::NotificationHistory;
pub use tracker::{
    MissAlert, MissStreakTracker, StatisticsSnapshot, UserStats, DEFAULT_MISS_THRESHOLD,
};
