//! Multiplayer rank-based rating updates
//!
//! Transforms a final placement order for N players into pairwise Elo
//! comparisons: every participant is scored against every other, and
//! the accumulated surprise is scaled by `k / (n - 1)` so the learning
//! rate does not depend on field size.

use crate::error::{LadderError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the multiplayer rank updater
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MultiplayerConfig {
    /// Sensitivity constant applied per opponent comparison
    pub k: f64,
}

impl Default for MultiplayerConfig {
    fn default() -> Self {
        Self { k: 24.0 }
    }
}

impl MultiplayerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "multiplayer k factor must be finite".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Stateless N-player ranked-outcome rating updater
#[derive(Debug, Clone, Default)]
pub struct MultiplayerRankUpdater {
    config: MultiplayerConfig,
}

impl MultiplayerRankUpdater {
    pub fn new(config: MultiplayerConfig) -> Self {
        Self { config }
    }

    pub fn with_k(k: f64) -> Self {
        Self {
            config: MultiplayerConfig { k },
        }
    }

    /// Produce new ratings from parallel rating and rank sequences.
    ///
    /// Lower rank means better placement; equal ranks are draws. The
    /// sequences must have equal lengths of at least two; anything else
    /// is a caller-correctable input error.
    pub fn update(&self, ratings: &[f64], ranks: &[u32]) -> Result<Vec<f64>> {
        if ratings.len() != ranks.len() {
            return Err(LadderError::InvalidRatingInput {
                reason: format!(
                    "ratings and ranks must have the same length ({} vs {})",
                    ratings.len(),
                    ranks.len()
                ),
            }
            .into());
        }

        if ratings.len() < 2 {
            return Err(LadderError::InvalidRatingInput {
                reason: "a ranked outcome needs at least two participants".to_string(),
            }
            .into());
        }

        let n = ratings.len();
        let scale = self.config.k / (n - 1) as f64;

        let new_ratings = (0..n)
            .map(|i| {
                let surprise: f64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        let expected =
                            1.0 / (1.0 + 10f64.powf((ratings[j] - ratings[i]) / 400.0));
                        let actual = match ranks[i].cmp(&ranks[j]) {
                            std::cmp::Ordering::Less => 1.0,
                            std::cmp::Ordering::Greater => 0.0,
                            std::cmp::Ordering::Equal => 0.5,
                        };
                        actual - expected
                    })
                    .sum();
                ratings[i] + scale * surprise
            })
            .collect();

        Ok(new_ratings)
    }
}
