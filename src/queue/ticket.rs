//! Matchmaking tickets
//!
//! A ticket is one pending match request. It is created when a player
//! asks for a match and destroyed when matched or withdrawn; the queue
//! is its sole owner in between.

use crate::types::{GameMode, PlayerId, RatingValue, TicketId};
use crate::utils::{current_timestamp, generate_ticket_id};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A pending matchmaking request from one player or party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchTicket {
    pub ticket_id: TicketId,
    pub player_id: PlayerId,
    pub rating: RatingValue,
    pub mode: GameMode,
    pub party_size: u32,
    pub enqueued_at: DateTime<Utc>,
    /// Games the player has completed before this request; drives the
    /// newbie/veteran pool partition
    pub experience_count: u32,
}

impl MatchTicket {
    pub fn new(
        player_id: impl Into<PlayerId>,
        rating: RatingValue,
        mode: impl Into<GameMode>,
        experience_count: u32,
    ) -> Self {
        Self {
            ticket_id: generate_ticket_id(),
            player_id: player_id.into(),
            rating,
            mode: mode.into(),
            party_size: 1,
            enqueued_at: current_timestamp(),
            experience_count,
        }
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size.max(1);
        self
    }

    /// Back-date the enqueue time, used by tests and simulations to
    /// model tickets that have already waited
    pub fn enqueued_at(mut self, enqueued_at: DateTime<Utc>) -> Self {
        self.enqueued_at = enqueued_at;
        self
    }

    /// Time this ticket has spent waiting as of `now`. Clock skew is
    /// clamped to zero rather than producing a negative wait.
    pub fn wait_time(&self, now: DateTime<Utc>) -> Duration {
        (now - self.enqueued_at).max(Duration::zero())
    }

    /// Whether this ticket belongs to the newbie pool under the given
    /// experience threshold
    pub fn is_newbie(&self, newbie_game_limit: u32) -> bool {
        self.experience_count < newbie_game_limit
    }
}
