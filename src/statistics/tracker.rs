//! Miss Streak Tracker
//!
//! Per-user hit/miss counters fed by point notifications.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tracing::{error, info};

use crate::models::{PointNotification, UserId};

/// Consecutive misses at which alerts start firing.
pub const DEFAULT_MISS_THRESHOLD: u32 = 3;

// == User Stats ==
/// Counters for a single user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_points: u64,
    pub hit_points: u64,
    /// Misses since the last hit
    pub consecutive_misses: u32,
}

impl UserStats {
    /// Share of this user's points that missed, in percent. 0 without points.
    pub fn miss_percentage(&self) -> f64 {
        if self.total_points == 0 {
            0.0
        } else {
            (self.total_points - self.hit_points) as f64 * 100.0 / self.total_points as f64
        }
    }
}

/// Raised when a user's miss streak is at or past the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissAlert {
    pub user_id: UserId,
    pub consecutive_misses: u32,
}

// == Statistics Snapshot ==
/// Aggregate view across all users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_points: u64,
    pub hit_points: u64,
    pub miss_percentage: f64,
    pub max_consecutive_misses: u32,
    pub tracked_users: usize,
    pub alerts_fired: u64,
}

// == Miss Streak Tracker ==
/// Tracks consecutive misses per user and raises alerts.
///
/// Once a streak reaches the threshold, every further miss raises another
/// alert until a hit resets the streak.
#[derive(Debug)]
pub struct MissStreakTracker {
    users: DashMap<UserId, UserStats>,
    threshold: u32,
    alerts_fired: AtomicU64,
}

impl MissStreakTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            users: DashMap::new(),
            threshold,
            alerts_fired: AtomicU64::new(0),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    // == Record ==
    /// Applies a notification to its user's counters.
    pub fn record(&self, notification: &PointNotification) -> Option<MissAlert> {
        self.record_point(notification.user_id, notification.is_hit())
    }

    /// Applies one hit or miss to a user's counters.
    pub fn record_point(&self, user_id: UserId, hit: bool) -> Option<MissAlert> {
        let stats = {
            let mut stats = self.users.entry(user_id).or_default();
            stats.total_points += 1;
            if hit {
                stats.hit_points += 1;
                stats.consecutive_misses = 0;
            } else {
                stats.consecutive_misses += 1;
            }
            *stats
        };

        if hit {
            info!(%user_id, hits = stats.hit_points, "Hit recorded");
            return None;
        }

        info!(%user_id, consecutive_misses = stats.consecutive_misses, "Miss recorded");
        if stats.consecutive_misses < self.threshold {
            return None;
        }

        self.alerts_fired.fetch_add(1, Ordering::Relaxed);
        error!(
            %user_id,
            consecutive_misses = stats.consecutive_misses,
            "ALERT: user has {} consecutive misses",
            stats.consecutive_misses
        );
        Some(MissAlert {
            user_id,
            consecutive_misses: stats.consecutive_misses,
        })
    }

    // == Aggregates ==
    /// Points recorded across all users.
    pub fn total_points(&self) -> u64 {
        self.users.iter().map(|s| s.total_points).sum()
    }

    /// Hits recorded across all users.
    pub fn hit_points(&self) -> u64 {
        self.users.iter().map(|s| s.hit_points).sum()
    }

    /// Mean of the per-user miss percentages, 0 when no user is tracked.
    ///
    /// Every tracked user counts in the denominator, including users whose
    /// percentage is 0.
    pub fn miss_percentage(&self) -> f64 {
        let (sum, users) = self
            .users
            .iter()
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.miss_percentage(), n + 1));
        if users == 0 {
            0.0
        } else {
            sum / users as f64
        }
    }

    /// Longest current miss streak of any user.
    pub fn max_consecutive_misses(&self) -> u32 {
        self.users
            .iter()
            .map(|s| s.consecutive_misses)
            .max()
            .unwrap_or(0)
    }

    pub fn user_stats(&self, user_id: UserId) -> Option<UserStats> {
        self.users.get(&user_id).map(|s| *s)
    }

    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired.load(Ordering::Relaxed)
    }

    // == Reset ==
    /// Zeroes every user's miss streak. Totals are kept.
    pub fn reset_consecutive_misses(&self) {
        self.users
            .iter_mut()
            .for_each(|mut s| s.consecutive_misses = 0);
        info!("Consecutive misses reset for all users");
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_points: self.total_points(),
            hit_points: self.hit_points(),
            miss_percentage: self.miss_percentage(),
            max_consecutive_misses: self.max_consecutive_misses(),
            tracked_users: self.tracked_users(),
            alerts_fired: self.alerts_fired(),
        }
    }
}

impl Default for MissStreakTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MISS_THRESHOLD)
    }
}
