//! Metrics and monitoring for the rating and matchmaking core

pub mod collector;
pub mod health;

pub use collector::{MetricsCollector, QueueMetrics, RatingMetrics};
pub use health::{HealthServer, HealthServerConfig};
