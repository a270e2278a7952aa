//! Shared building blocks for the hemolink workspace: configuration,
//! database/Redis connections, the common error type, and domain types.

pub mod config;
pub mod db;
pub mod error;
pub mod redis_pool;
pub mod types;
