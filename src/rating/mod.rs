//! Rating systems: Elo, Glicko-2 and multiplayer rank-based updates
//!
//! All updaters are pure and stateless: they take current ratings plus
//! a result and return new ratings. Callers own persistence via the
//! storage seam in [`storage`].

pub mod elo;
pub mod glicko2;
pub mod multiplayer;
pub mod storage;

// Re-export commonly used types
pub use elo::{EloConfig, EloUpdater};
pub use glicko2::{Glicko2Config, Glicko2Updater, GlickoProfile, GLICKO2_SCALE};
pub use multiplayer::{MultiplayerConfig, MultiplayerRankUpdater};
pub use storage::{InMemoryRatingStorage, ProfileEntry, RatingStorage};
