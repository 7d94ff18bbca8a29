//! Main application configuration
//!
//! Defines the primary configuration structures for the rating and
//! matchmaking core, with defaults, environment variable overrides and
//! TOML file loading.

use crate::queue::policy::{AnchorPolicyConfig, BestPairPolicyConfig};
use crate::queue::scheduler::SchedulerConfig;
use crate::rating::elo::EloConfig;
use crate::rating::glicko2::Glicko2Config;
use crate::rating::multiplayer::MultiplayerConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub queue: QueueSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the health/metrics endpoint
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Queue and policy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub scheduler: SchedulerConfig,
    pub anchor: AnchorPolicyConfig,
    pub best_pair: BestPairPolicyConfig,
}

/// Rating system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub elo: EloConfig,
    pub glicko2: Glicko2Config,
    pub multiplayer: MultiplayerConfig,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "arena-ladder".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.service.log_level = level;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            config.service.health_port = port.parse().context("Invalid HEALTH_PORT")?;
        }

        if let Ok(interval) = env::var("QUEUE_TICK_INTERVAL_MS") {
            config.queue.scheduler.tick_interval_ms =
                interval.parse().context("Invalid QUEUE_TICK_INTERVAL_MS")?;
        }
        if let Ok(window) = env::var("QUEUE_INITIAL_WINDOW") {
            let window: f64 = window.parse().context("Invalid QUEUE_INITIAL_WINDOW")?;
            config.queue.anchor.initial_window = window;
            config.queue.best_pair.initial_window = window;
        }
        if let Ok(limit) = env::var("QUEUE_NEWBIE_GAME_LIMIT") {
            let limit: u32 = limit.parse().context("Invalid QUEUE_NEWBIE_GAME_LIMIT")?;
            config.queue.anchor.newbie_game_limit = limit;
            config.queue.best_pair.newbie_game_limit = limit;
        }

        if let Ok(k) = env::var("ELO_K_FACTOR") {
            config.rating.elo.k = k.parse().context("Invalid ELO_K_FACTOR")?;
        }
        if let Ok(tau) = env::var("GLICKO2_TAU") {
            config.rating.glicko2.tau = tau.parse().context("Invalid GLICKO2_TAU")?;
        }
        if let Ok(k) = env::var("MULTIPLAYER_K_FACTOR") {
            config.rating.multiplayer.k = k.parse().context("Invalid MULTIPLAYER_K_FACTOR")?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate a complete configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.service.name.is_empty() {
        anyhow::bail!("service name must not be empty");
    }

    config.queue.scheduler.validate()?;
    config.queue.anchor.validate()?;
    config.queue.best_pair.validate()?;
    config.rating.elo.validate()?;
    config.rating.glicko2.validate()?;
    config.rating.multiplayer.validate()?;

    Ok(())
}
