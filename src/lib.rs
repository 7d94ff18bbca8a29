//! Arena Ladder - rating and matchmaking core for turn-based arena games
//!
//! This crate provides the numeric rating updaters (Elo, Glicko-2,
//! multiplayer rank-based) and a per-mode matchmaking queue with
//! wait-expanded compatibility windows and newbie/veteran pooling.
//! The game layer calls in with match results and tickets and gets
//! back updated ratings and formed groups.

pub mod config;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod rating;
pub mod synergy;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use queue::{MatchmakingQueue, MatchTicket, QueueScheduler};
pub use rating::{EloUpdater, Glicko2Updater, GlickoProfile, MultiplayerRankUpdater};
pub use synergy::TeamSynergyStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
