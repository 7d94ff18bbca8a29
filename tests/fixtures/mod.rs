//! Test fixtures and mock implementations for integration testing

use arena_ladder::error::Result;
use arena_ladder::queue::{MatchSink, MatchTicket};
use arena_ladder::types::MatchGroup;
use arena_ladder::utils::current_timestamp;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Arc, Mutex};

/// Sink that captures delivered match groups for assertions
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<MatchGroup>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<MatchGroup> {
        self.delivered
            .lock()
            .map(|groups| groups.clone())
            .unwrap_or_default()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered().len()
    }
}

#[async_trait]
impl MatchSink for RecordingSink {
    async fn deliver(&self, group: MatchGroup) -> Result<()> {
        if let Ok(mut groups) = self.delivered.lock() {
            groups.push(group);
        }
        Ok(())
    }
}

/// A ticket from an experienced player
pub fn veteran_ticket(id: &str, rating: f64, mode: &str) -> MatchTicket {
    MatchTicket::new(id, rating, mode, 50)
}

/// A ticket from a player still inside the newbie pool
pub fn newbie_ticket(id: &str, rating: f64, mode: &str) -> MatchTicket {
    MatchTicket::new(id, rating, mode, 2)
}

/// Back-date a ticket so it has already waited `seconds`
pub fn waited(ticket: MatchTicket, seconds: i64) -> MatchTicket {
    let backdated = current_timestamp() - Duration::seconds(seconds);
    ticket.enqueued_at(backdated)
}
