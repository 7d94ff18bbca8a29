//! Per-mode matchmaking queue
//!
//! The queue owns all outstanding tickets, partitioned by mode. Each
//! mode's pool sits behind its own mutex: a scan-and-remove pass holds
//! exclusive access to that mode for its duration, while other modes
//! proceed independently. `pop_match` never blocks waiting for players;
//! it either commits a group atomically or reports no match.

use crate::error::{LadderError, Result};
use crate::queue::policy::{AnchorExpansionPolicy, MatchPolicy};
use crate::queue::ticket::MatchTicket;
use crate::types::{GameMode, MatchGroup, PlayerId};
use crate::utils::current_timestamp;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

/// Stateful waiting pool for all modes
pub struct MatchmakingQueue {
    /// One ticket pool per mode, each behind its own lock
    modes: RwLock<HashMap<GameMode, Arc<Mutex<Vec<MatchTicket>>>>>,
    /// Policy overrides per mode
    policies: RwLock<HashMap<GameMode, Arc<dyn MatchPolicy>>>,
    /// Policy used for modes without an override
    default_policy: Arc<dyn MatchPolicy>,
}

impl Default for MatchmakingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::with_default_policy(Arc::new(AnchorExpansionPolicy::default()))
    }

    pub fn with_default_policy(default_policy: Arc<dyn MatchPolicy>) -> Self {
        Self {
            modes: RwLock::new(HashMap::new()),
            policies: RwLock::new(HashMap::new()),
            default_policy,
        }
    }

    /// Register a policy override for one mode
    pub fn set_mode_policy(&self, mode: impl Into<GameMode>, policy: Arc<dyn MatchPolicy>) {
        if let Ok(mut policies) = self.policies.write() {
            policies.insert(mode.into(), policy);
        }
    }

    fn policy_for(&self, mode: &str) -> Arc<dyn MatchPolicy> {
        self.policies
            .read()
            .ok()
            .and_then(|policies| policies.get(mode).cloned())
            .unwrap_or_else(|| self.default_policy.clone())
    }

    fn pool_for(&self, mode: &str) -> Result<Option<Arc<Mutex<Vec<MatchTicket>>>>> {
        let modes = self.modes.read().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire mode map read lock".to_string(),
        })?;
        Ok(modes.get(mode).cloned())
    }

    fn pool_for_or_create(&self, mode: &str) -> Result<Arc<Mutex<Vec<MatchTicket>>>> {
        if let Some(pool) = self.pool_for(mode)? {
            return Ok(pool);
        }

        let mut modes = self.modes.write().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire mode map write lock".to_string(),
        })?;
        Ok(modes
            .entry(mode.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone())
    }

    /// Admit a ticket into its mode's pool.
    ///
    /// A player may hold at most one live ticket per mode; a second
    /// enqueue is rejected so no scan can ever emit the same player
    /// twice in one group.
    pub fn enqueue(&self, ticket: MatchTicket) -> Result<()> {
        if ticket.player_id.is_empty() || ticket.mode.is_empty() {
            return Err(LadderError::InvalidTicket {
                reason: "player_id and mode must be non-empty".to_string(),
            }
            .into());
        }

        if !ticket.rating.is_finite() {
            return Err(LadderError::InvalidTicket {
                reason: format!("rating must be finite, got {}", ticket.rating),
            }
            .into());
        }

        let pool = self.pool_for_or_create(&ticket.mode)?;
        let mut tickets = pool.lock().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire ticket pool lock".to_string(),
        })?;

        if tickets.iter().any(|t| t.player_id == ticket.player_id) {
            return Err(LadderError::InvalidTicket {
                reason: format!(
                    "player {} already has a live ticket in mode {}",
                    ticket.player_id, ticket.mode
                ),
            }
            .into());
        }

        debug!(
            player = %ticket.player_id,
            mode = %ticket.mode,
            rating = ticket.rating,
            "ticket enqueued"
        );
        tickets.push(ticket);
        Ok(())
    }

    /// Remove a player's ticket without matching it
    pub fn withdraw(&self, player_id: &PlayerId, mode: &str) -> Result<MatchTicket> {
        let pool = self
            .pool_for(mode)?
            .ok_or_else(|| LadderError::TicketNotFound {
                player_id: player_id.clone(),
                mode: mode.to_string(),
            })?;

        let mut tickets = pool.lock().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire ticket pool lock".to_string(),
        })?;

        let position = tickets
            .iter()
            .position(|t| &t.player_id == player_id)
            .ok_or_else(|| LadderError::TicketNotFound {
                player_id: player_id.clone(),
                mode: mode.to_string(),
            })?;

        let ticket = tickets.remove(position);
        debug!(player = %player_id, mode, "ticket withdrawn");
        Ok(ticket)
    }

    /// Try to form one match of `required_size` players in `mode`.
    ///
    /// Returns `Ok(None)` when the pool is too small or no candidate
    /// set qualifies; the caller retries on a later tick. A committed
    /// group's tickets are removed atomically with their selection.
    pub fn pop_match(&self, mode: &str, required_size: usize) -> Result<Option<MatchGroup>> {
        let Some(pool) = self.pool_for(mode)? else {
            return Ok(None);
        };

        let mut tickets = pool.lock().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire ticket pool lock".to_string(),
        })?;

        if tickets.len() < required_size || required_size == 0 {
            return Ok(None);
        }

        let policy = self.policy_for(mode);
        let now = current_timestamp();
        let Some(selected) = policy.select(&tickets, required_size, now) else {
            return Ok(None);
        };

        let group_tickets: Vec<MatchTicket> =
            selected.iter().map(|&i| tickets[i].clone()).collect();

        // Remove from the back so earlier indices stay valid
        let mut removal = selected.clone();
        removal.sort_unstable_by(|a, b| b.cmp(a));
        for index in removal {
            tickets.remove(index);
        }

        info!(
            mode,
            policy = policy.name(),
            players = ?group_tickets.iter().map(|t| t.player_id.as_str()).collect::<Vec<_>>(),
            "match formed"
        );

        Ok(Some(MatchGroup {
            mode: mode.to_string(),
            tickets: group_tickets,
            formed_at: now,
        }))
    }

    /// Number of tickets waiting in a mode
    pub fn queue_size(&self, mode: &str) -> usize {
        self.pool_for(mode)
            .ok()
            .flatten()
            .and_then(|pool| pool.lock().ok().map(|tickets| tickets.len()))
            .unwrap_or(0)
    }

    /// Waiting-ticket counts for every known mode
    pub fn depths(&self) -> HashMap<GameMode, usize> {
        let Ok(modes) = self.modes.read() else {
            return HashMap::new();
        };

        modes
            .iter()
            .map(|(mode, pool)| {
                let depth = pool.lock().map(|tickets| tickets.len()).unwrap_or(0);
                (mode.clone(), depth)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::policy::BestPairPolicy;
    use chrono::Duration;

    fn queue_1v1() -> MatchmakingQueue {
        let queue = MatchmakingQueue::new();
        queue.set_mode_policy("ranked_1v1", Arc::new(BestPairPolicy::default()));
        queue
    }

    fn ticket(id: &str, rating: f64, mode: &str) -> MatchTicket {
        MatchTicket::new(id, rating, mode, 20)
    }

    #[test]
    fn test_close_ratings_match_immediately() {
        let queue = queue_1v1();
        queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).unwrap();
        queue.enqueue(ticket("p2", 1540.0, "ranked_1v1")).unwrap();

        let group = queue.pop_match("ranked_1v1", 2).unwrap().unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(queue.queue_size("ranked_1v1"), 0);
    }

    #[test]
    fn test_undersized_pool_returns_none() {
        let queue = queue_1v1();
        queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).unwrap();

        assert!(queue.pop_match("ranked_1v1", 2).unwrap().is_none());
        assert_eq!(queue.queue_size("ranked_1v1"), 1);
    }

    #[test]
    fn test_unknown_mode_is_no_match() {
        let queue = MatchmakingQueue::new();
        assert!(queue.pop_match("nowhere", 2).unwrap().is_none());
    }

    #[test]
    fn test_window_expansion_over_wait() {
        let queue = queue_1v1();
        let old = ticket("p1", 1500.0, "ranked_1v1")
            .enqueued_at(current_timestamp() - Duration::seconds(45));
        queue.enqueue(old).unwrap();
        queue.enqueue(ticket("p2", 1620.0, "ranked_1v1")).unwrap();

        // 120 apart, and the fresh ticket has not waited: no match yet
        assert!(queue.pop_match("ranked_1v1", 2).unwrap().is_none());
    }

    #[test]
    fn test_matched_players_do_not_reappear() {
        let queue = queue_1v1();
        for (id, rating) in [("a", 1500.0), ("b", 1510.0), ("c", 1505.0), ("d", 1495.0)] {
            queue.enqueue(ticket(id, rating, "ranked_1v1")).unwrap();
        }

        let first = queue.pop_match("ranked_1v1", 2).unwrap().unwrap();
        let second = queue.pop_match("ranked_1v1", 2).unwrap().unwrap();

        let mut seen: Vec<String> = first
            .player_ids()
            .into_iter()
            .chain(second.player_ids())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 4);
        assert!(queue.pop_match("ranked_1v1", 2).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_enqueue_rejected() {
        let queue = queue_1v1();
        queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).unwrap();
        assert!(queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).is_err());

        // Same player in a different mode is fine
        queue.enqueue(ticket("p1", 1500.0, "party_4p")).unwrap();
    }

    #[test]
    fn test_withdraw_removes_ticket() {
        let queue = queue_1v1();
        queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).unwrap();
        queue.enqueue(ticket("p2", 1500.0, "ranked_1v1")).unwrap();

        let withdrawn = queue.withdraw(&"p1".to_string(), "ranked_1v1").unwrap();
        assert_eq!(withdrawn.player_id, "p1");
        assert_eq!(queue.queue_size("ranked_1v1"), 1);
        assert!(queue.pop_match("ranked_1v1", 2).unwrap().is_none());
    }

    #[test]
    fn test_withdraw_unknown_is_error() {
        let queue = queue_1v1();
        assert!(queue.withdraw(&"ghost".to_string(), "ranked_1v1").is_err());

        queue.enqueue(ticket("p1", 1500.0, "ranked_1v1")).unwrap();
        assert!(queue.withdraw(&"ghost".to_string(), "ranked_1v1").is_err());
    }

    #[test]
    fn test_modes_are_independent() {
        let queue = MatchmakingQueue::new();
        queue.enqueue(ticket("a", 1500.0, "party_4p")).unwrap();
        queue.enqueue(ticket("b", 1500.0, "ranked_1v1")).unwrap();

        assert_eq!(queue.queue_size("party_4p"), 1);
        assert_eq!(queue.queue_size("ranked_1v1"), 1);
        assert!(queue.pop_match("party_4p", 2).unwrap().is_none());

        let depths = queue.depths();
        assert_eq!(depths["party_4p"], 1);
        assert_eq!(depths["ranked_1v1"], 1);
    }

    #[test]
    fn test_anchor_policy_forms_party() {
        let queue = MatchmakingQueue::new();
        for (id, rating) in [
            ("a", 1500.0),
            ("b", 1530.0),
            ("c", 1470.0),
            ("d", 1550.0),
        ] {
            queue.enqueue(ticket(id, rating, "party_4p")).unwrap();
        }

        let group = queue.pop_match("party_4p", 4).unwrap().unwrap();
        assert_eq!(group.len(), 4);
        assert_eq!(queue.queue_size("party_4p"), 0);
    }

    #[test]
    fn test_invalid_ticket_rejected() {
        let queue = MatchmakingQueue::new();
        assert!(queue.enqueue(ticket("", 1500.0, "ranked_1v1")).is_err());
        assert!(queue
            .enqueue(ticket("p1", f64::NAN, "ranked_1v1"))
            .is_err());
    }
}
