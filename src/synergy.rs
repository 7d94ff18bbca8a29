//! Pairwise team synergy tracking
//!
//! Accumulates a cooperative-history score per unordered pair of
//! players. The score only grows, by a fixed increment per recorded
//! win together. Grouping policies may consult it as a soft signal;
//! none of the shipped policies require it.

use crate::error::{LadderError, Result};
use crate::types::PlayerId;
use std::collections::HashMap;
use std::sync::RwLock;

/// Default score added per recorded win together
pub const DEFAULT_WIN_INCREMENT: f64 = 0.1;

/// Additive store of pairwise cooperative history
#[derive(Debug)]
pub struct TeamSynergyStore {
    scores: RwLock<HashMap<(PlayerId, PlayerId), f64>>,
    win_increment: f64,
}

impl Default for TeamSynergyStore {
    fn default() -> Self {
        Self::new(DEFAULT_WIN_INCREMENT)
    }
}

impl TeamSynergyStore {
    pub fn new(win_increment: f64) -> Self {
        Self {
            scores: RwLock::new(HashMap::new()),
            win_increment,
        }
    }

    /// Normalize to an unordered pair key
    fn pair_key(p1: &PlayerId, p2: &PlayerId) -> (PlayerId, PlayerId) {
        if p1 <= p2 {
            (p1.clone(), p2.clone())
        } else {
            (p2.clone(), p1.clone())
        }
    }

    /// Accumulated synergy for a pair; 0.0 when they have no history
    pub fn get(&self, p1: &PlayerId, p2: &PlayerId) -> Result<f64> {
        let scores = self.scores.read().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire synergy read lock".to_string(),
        })?;

        Ok(scores
            .get(&Self::pair_key(p1, p2))
            .copied()
            .unwrap_or(0.0))
    }

    /// Record a win the pair earned together
    pub fn record_win(&self, p1: &PlayerId, p2: &PlayerId) -> Result<()> {
        let mut scores = self
            .scores
            .write()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire synergy write lock".to_string(),
            })?;

        *scores.entry(Self::pair_key(p1, p2)).or_insert(0.0) += self.win_increment;
        Ok(())
    }
}
