//! Configuration management for the rating and matchmaking core
//!
//! Handles configuration loading from environment variables or TOML,
//! validation, and default values.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, QueueSettings, RatingSettings, ServiceSettings};
