//! Error types for the point service
//!
//! Provides unified error handling using thiserror. Cache and publish errors
//! never leave the coordinator; store errors are surfaced to callers.

use thiserror::Error;
use uuid::Uuid;

// == Cache Error Enum ==
/// Failure of a point cache operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Entry holds more points than a single cache entry may carry
    #[error("Cache entry for user {user_id} too large: {len} points")]
    EntryTooLarge { user_id: Uuid, len: usize },

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Cache backend cannot serve requests
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

// == Store Error Enum ==
/// Failure reported by the point store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Point does not exist
    #[error("Point not found with id: {0}")]
    NotFound(Uuid),

    /// Backend I/O failure
    #[error("Store I/O error: {0}")]
    Io(String),

    /// Write rejected by the store
    #[error("Store constraint violation: {0}")]
    Constraint(String),
}

// == Publish Error Enum ==
/// Failure to hand a notification to the bus.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishError {
    /// Nobody is listening on the topic
    #[error("No subscribers on topic: {0}")]
    NoSubscribers(String),

    /// Bus has been shut down
    #[error("Notification bus closed")]
    Closed,
}

// == Point Error Enum ==
/// Error returned by point service operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == Result Type Aliases ==
/// Convenience Result type for point service operations.
pub type Result<T> = std::result::Result<T, PointError>;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type PublishResult<T> = std::result::Result<T, PublishError>;
