//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::statistics::DEFAULT_MISS_THRESHOLD;

/// Default topic point notifications are published on.
pub const DEFAULT_NOTIFICATION_TOPIC: &str = "user.notifications.point";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of users the point cache can hold
    pub cache_max_entries: usize,
    /// Time-to-live in seconds of a cache entry, counted from its last write
    pub cache_ttl_secs: u64,
    /// Background cache maintenance interval in seconds
    pub cache_maintenance_interval: u64,
    /// Consecutive misses at which an alert is raised
    pub miss_threshold: u32,
    /// Topic point notifications are published on
    pub notification_topic: String,
    /// Buffered notifications per topic before slow subscribers lag
    pub notification_channel_capacity: usize,
    /// Maximum notifications kept in the history log
    pub notification_history_limit: usize,
    /// User the binary submits points for
    pub username: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cached users (default: 1000)
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 10)
    /// - `CACHE_MAINTENANCE_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `MISS_THRESHOLD` - Consecutive misses before alerting (default: 3)
    /// - `NOTIFICATION_TOPIC` - Notification topic (default: user.notifications.point)
    /// - `NOTIFICATION_CHANNEL_CAPACITY` - Per-topic buffer (default: 1024)
    /// - `NOTIFICATION_HISTORY_LIMIT` - Kept notifications (default: 1000)
    /// - `POINT_USER` - Submitting user name (default: demo)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            cache_maintenance_interval: env_or(
                "CACHE_MAINTENANCE_INTERVAL",
                defaults.cache_maintenance_interval,
            ),
            miss_threshold: env_or("MISS_THRESHOLD", defaults.miss_threshold),
            notification_topic: env::var("NOTIFICATION_TOPIC")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.notification_topic),
            notification_channel_capacity: env_or(
                "NOTIFICATION_CHANNEL_CAPACITY",
                defaults.notification_channel_capacity,
            ),
            notification_history_limit: env_or(
                "NOTIFICATION_HISTORY_LIMIT",
                defaults.notification_history_limit,
            ),
            username: env::var("POINT_USER")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.username),
        }
    }

    /// Entry TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_ttl_secs: 10,
            cache_maintenance_interval: 1,
            miss_threshold: DEFAULT_MISS_THRESHOLD,
            notification_topic: DEFAULT_NOTIFICATION_TOPIC.to_string(),
            notification_channel_capacity: 1024,
            notification_history_limit: 1000,
            username: "demo".to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
