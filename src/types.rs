//! Common types used throughout the rating and matchmaking core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for queue tickets
pub type TicketId = Uuid;

/// Queue mode identifier (e.g. "ranked_1v1", "party_4p")
pub type GameMode = String;

/// A relative skill value. Only comparisons between values are
/// meaningful; there are no fixed bounds.
pub type RatingValue = f64;

/// Minimal rating state for the pairwise Elo system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloProfile {
    pub rating: RatingValue,
}

impl Default for EloProfile {
    fn default() -> Self {
        Self { rating: 1500.0 }
    }
}

impl EloProfile {
    pub fn new(rating: RatingValue) -> Self {
        Self { rating }
    }
}

/// Persistent ladder state for a player on the 1v1 ladder.
///
/// Mutated only by match settlement; `games_played` increments by
/// exactly one per settled match per participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderProfile {
    pub player_id: PlayerId,
    pub rating: RatingValue,
    pub deviation: f64,
    pub games_played: u32,
}

impl LadderProfile {
    /// Create a fresh ladder profile with starting values
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            rating: 1000.0,
            deviation: 350.0,
            games_played: 0,
        }
    }

    pub fn with_rating(player_id: impl Into<PlayerId>, rating: RatingValue) -> Self {
        Self {
            rating,
            ..Self::new(player_id)
        }
    }
}

/// A fully formed match returned by the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchGroup {
    pub mode: GameMode,
    pub tickets: Vec<crate::queue::ticket::MatchTicket>,
    pub formed_at: DateTime<Utc>,
}

impl MatchGroup {
    /// Player ids in the group, in ticket order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.tickets.iter().map(|t| t.player_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
