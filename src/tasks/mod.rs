//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the service.
//!
//! # Tasks
//! - Cache maintenance: removes expired cache entries and logs cache metrics
//! - Statistics consumer: feeds point notifications to the miss streak tracker

mod consumer;
mod maintenance;

pub use consumer::spawn_statistics_consumer;
pub use maintenance::spawn_cache_maintenance_task;
