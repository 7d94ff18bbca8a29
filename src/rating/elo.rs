//! Elo rating system implementation
//!
//! Stateless pairwise rating updates: callers supply two ratings and an
//! outcome, and receive the two updated ratings. Persistence is the
//! caller's concern; nothing here mutates stored state except the
//! explicit ladder settlement helper.

use crate::error::Result;
use crate::types::{EloProfile, LadderProfile};
use crate::utils::round_rating;
use serde::{Deserialize, Serialize};

/// Configuration for the Elo updater
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EloConfig {
    /// Sensitivity constant: the maximum rating swing of a single game
    pub k: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self { k: 32.0 }
    }
}

impl EloConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "Elo k factor must be finite".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Stateless pairwise Elo rating updater
#[derive(Debug, Clone, Default)]
pub struct EloUpdater {
    config: EloConfig,
}

impl EloUpdater {
    pub fn new(config: EloConfig) -> Self {
        Self { config }
    }

    pub fn with_k(k: f64) -> Self {
        Self {
            config: EloConfig { k },
        }
    }

    /// Expected score of the first player against the second
    pub fn expected_score(&self, ra: f64, rb: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((rb - ra) / 400.0))
    }

    /// Apply one game's outcome to a pair of ratings.
    ///
    /// `score_a` is 1.0 for an A win, 0.0 for an A loss, 0.5 for a draw.
    /// The two deltas always sum to zero: the pairwise system is closed.
    pub fn update(&self, ra: f64, rb: f64, score_a: f64) -> (f64, f64) {
        let expected_a = self.expected_score(ra, rb);
        let expected_b = 1.0 - expected_a;
        let new_ra = ra + self.config.k * (score_a - expected_a);
        let new_rb = rb + self.config.k * ((1.0 - score_a) - expected_b);
        (new_ra, new_rb)
    }

    /// Profile-level convenience over [`update`](Self::update)
    pub fn update_profiles(
        &self,
        a: &EloProfile,
        b: &EloProfile,
        score_a: f64,
    ) -> (EloProfile, EloProfile) {
        let (na, nb) = self.update(a.rating, b.rating, score_a);
        (EloProfile::new(na), EloProfile::new(nb))
    }

    /// Settle a finished 1v1 ladder match.
    ///
    /// Ratings are stored to two decimals and each participant's game
    /// count increments by exactly one.
    pub fn settle_match_1v1(&self, winner: &mut LadderProfile, loser: &mut LadderProfile) {
        let (new_winner, new_loser) = self.update(winner.rating, loser.rating, 1.0);
        winner.rating = round_rating(new_winner);
        loser.rating = round_rating(new_loser);
        winner.games_played += 1;
        loser.games_played += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_expected_score_symmetry() {
        let elo = EloUpdater::default();
        let ea = elo.expected_score(1500.0, 1500.0);
        assert!((ea - 0.5).abs() < 1e-12);

        let strong = elo.expected_score(1700.0, 1300.0);
        let weak = elo.expected_score(1300.0, 1700.0);
        assert!(strong > 0.9);
        assert!((strong + weak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_win_increases_loss_decreases() {
        let elo = EloUpdater::with_k(32.0);
        let (na, nb) = elo.update(1500.0, 1500.0, 1.0);
        assert!(na > 1500.0);
        assert!(nb < 1500.0);

        let (la, lb) = elo.update(1500.0, 1500.0, 0.0);
        assert!(la < 1500.0);
        assert!(lb > 1500.0);
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        let elo = EloUpdater::default();
        let (na, nb) = elo.update(1500.0, 1500.0, 0.5);
        assert!((na - 1500.0).abs() < 1e-12);
        assert!((nb - 1500.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_profiles() {
        let elo = EloUpdater::default();
        let a = EloProfile::new(1500.0);
        let b = EloProfile::new(1540.0);
        let (na, nb) = elo.update_profiles(&a, &b, 1.0);
        assert!(na.rating > a.rating);
        assert!(nb.rating < b.rating);
    }

    #[test]
    fn test_settle_match_1v1() {
        let elo = EloUpdater::with_k(32.0);
        let mut winner = LadderProfile::new("a");
        let mut loser = LadderProfile::new("b");

        elo.settle_match_1v1(&mut winner, &mut loser);

        assert!(winner.rating > 1000.0);
        assert!(loser.rating < 1000.0);
        assert_eq!(winner.games_played, 1);
        assert_eq!(loser.games_played, 1);

        // Stored ratings carry two decimals
        assert_eq!(winner.rating, (winner.rating * 100.0).round() / 100.0);
    }

    proptest! {
        #[test]
        fn prop_deltas_sum_to_zero(
            ra in 0.0f64..4000.0,
            rb in 0.0f64..4000.0,
            score_a in 0.0f64..=1.0,
            k in 1.0f64..64.0,
        ) {
            let elo = EloUpdater::with_k(k);
            let (na, nb) = elo.update(ra, rb, score_a);
            let delta_sum = (na - ra) + (nb - rb);
            prop_assert!(delta_sum.abs() < 1e-9);
        }

        #[test]
        fn prop_winner_gains_loser_drops(r in 0.0f64..4000.0, k in 1.0f64..64.0) {
            let elo = EloUpdater::with_k(k);
            let (na, nb) = elo.update(r, r, 1.0);
            prop_assert!(na > r);
            prop_assert!(nb < r);
        }
    }
}
