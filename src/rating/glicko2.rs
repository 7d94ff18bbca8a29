//! Glicko-2 rating system implementation
//!
//! Updates a player's rating, rating deviation and volatility from the
//! results of one rating period. The volatility update requires a 1-D
//! root find, performed here with the Illinois variant of regula falsi
//! over an explicit bracket value.

use crate::error::{LadderError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

/// Conversion factor between the public rating scale and the internal
/// Glicko-2 scale.
pub const GLICKO2_SCALE: f64 = 173.7178;

/// Rating state for the Glicko-2 system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlickoProfile {
    pub rating: f64,
    /// Uncertainty of the rating. Shrinks with informative play, grows
    /// with inactivity.
    pub deviation: f64,
    pub volatility: f64,
}

impl Default for GlickoProfile {
    fn default() -> Self {
        Self {
            rating: 1500.0,
            deviation: 350.0,
            volatility: 0.06,
        }
    }
}

impl GlickoProfile {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        Self {
            rating,
            deviation,
            volatility,
        }
    }

    /// Rating on the internal scale
    fn mu(&self) -> f64 {
        (self.rating - 1500.0) / GLICKO2_SCALE
    }

    /// Deviation on the internal scale
    fn phi(&self) -> f64 {
        self.deviation / GLICKO2_SCALE
    }
}

/// Configuration for the Glicko-2 updater
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Glicko2Config {
    /// System constant constraining volatility change per period
    pub tau: f64,
    /// Lower bound applied to the deviation after a rated update
    pub deviation_floor: f64,
    /// Bracket width at which the volatility solve is considered done
    pub convergence_tolerance: f64,
    /// Iteration bound for the volatility solve; exceeding it is a
    /// fatal error, not a recoverable one
    pub max_iterations: u32,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            tau: 0.5,
            deviation_floor: 30.0,
            convergence_tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl Glicko2Config {
    pub fn validate(&self) -> Result<()> {
        if self.tau <= 0.0 || !self.tau.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "tau must be positive and finite".to_string(),
            }
            .into());
        }

        if self.deviation_floor < 0.0 {
            return Err(LadderError::ConfigurationError {
                message: "deviation_floor must be non-negative".to_string(),
            }
            .into());
        }

        if self.convergence_tolerance <= 0.0 {
            return Err(LadderError::ConfigurationError {
                message: "convergence_tolerance must be positive".to_string(),
            }
            .into());
        }

        if self.max_iterations == 0 {
            return Err(LadderError::ConfigurationError {
                message: "max_iterations must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Stateless Glicko-2 rating updater
#[derive(Debug, Clone, Default)]
pub struct Glicko2Updater {
    config: Glicko2Config,
}

/// Root-finding bracket: endpoints and their objective values.
/// Each Illinois step produces a new bracket; no endpoint is mutated
/// in place.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    a: f64,
    fa: f64,
    b: f64,
    fb: f64,
}

impl Glicko2Updater {
    pub fn new(config: Glicko2Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Glicko2Config {
        &self.config
    }

    /// Opponent-deviation weight `g(phi)`
    fn g(phi: f64) -> f64 {
        1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
    }

    /// Expected score against one opponent on the internal scale
    fn e(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
        1.0 / (1.0 + (-Self::g(phi_j) * (mu - mu_j)).exp())
    }

    /// Apply one rating period's results to a profile.
    ///
    /// `results` holds `(opponent, score)` pairs where score is 1.0 for
    /// a win, 0.0 for a loss and 0.5 for a draw. An empty result list
    /// models inactivity: the rating and volatility are unchanged and
    /// the deviation grows.
    pub fn update(
        &self,
        profile: &GlickoProfile,
        results: &[(GlickoProfile, f64)],
    ) -> Result<GlickoProfile> {
        self.validate_profile(profile)?;
        for (opponent, _) in results {
            self.validate_profile(opponent)?;
        }

        let mu = profile.mu();
        let phi = profile.phi();

        if results.is_empty() {
            let inflated_phi = (phi * phi + profile.volatility * profile.volatility).sqrt();
            return Ok(GlickoProfile {
                rating: profile.rating,
                deviation: inflated_phi * GLICKO2_SCALE,
                volatility: profile.volatility,
            });
        }

        // Estimated variance of the rating from game outcomes alone,
        // and the estimated improvement delta.
        let mut v_inv = 0.0;
        let mut delta_sum = 0.0;
        for (opponent, score) in results {
            let g_val = Self::g(opponent.phi());
            let e_val = Self::e(mu, opponent.mu(), opponent.phi());
            v_inv += g_val * g_val * e_val * (1.0 - e_val);
            delta_sum += g_val * (score - e_val);
        }

        let v = 1.0 / v_inv;
        let delta = v * delta_sum;

        let new_volatility = self.solve_volatility(phi, v, delta, profile.volatility)?;

        let phi_star = (phi * phi + new_volatility * new_volatility).sqrt();
        let new_phi = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let new_mu = mu + new_phi * new_phi * delta_sum;

        let deviation = (new_phi * GLICKO2_SCALE).max(self.config.deviation_floor);

        Ok(GlickoProfile {
            rating: new_mu * GLICKO2_SCALE + 1500.0,
            deviation,
            volatility: new_volatility,
        })
    }

    fn validate_profile(&self, profile: &GlickoProfile) -> Result<()> {
        if !profile.rating.is_finite() {
            return Err(LadderError::InvalidRatingInput {
                reason: format!("rating must be finite, got {}", profile.rating),
            }
            .into());
        }

        if profile.deviation <= 0.0 || !profile.deviation.is_finite() {
            return Err(LadderError::InvalidRatingInput {
                reason: format!("deviation must be positive, got {}", profile.deviation),
            }
            .into());
        }

        if profile.volatility <= 0.0 || !profile.volatility.is_finite() {
            return Err(LadderError::InvalidRatingInput {
                reason: format!("volatility must be positive, got {}", profile.volatility),
            }
            .into());
        }

        Ok(())
    }

    /// Solve for the new volatility on the log-variance scale.
    ///
    /// The objective is Glickman's f(x); the root is bracketed and then
    /// narrowed with Illinois steps until the bracket width drops under
    /// the configured tolerance.
    fn solve_volatility(&self, phi: f64, v: f64, delta: f64, volatility: f64) -> Result<f64> {
        let a = (volatility * volatility).ln();
        let tau = self.config.tau;

        let objective = |x: f64| -> f64 {
            let ex = x.exp();
            let num = ex * (delta * delta - phi * phi - v - ex);
            let den = 2.0 * (phi * phi + v + ex) * (phi * phi + v + ex);
            num / den - (x - a) / (tau * tau)
        };

        // Initial bracket: the lower end is always a. The upper end is
        // the analytic guess when the improvement outweighs the prior
        // variance, otherwise found by stepping down in units of tau.
        let b = if delta * delta > phi * phi + v {
            (delta * delta - phi * phi - v).ln()
        } else {
            let mut k = 1u32;
            while objective(a - f64::from(k) * tau) < 0.0 {
                k += 1;
                if k > self.config.max_iterations {
                    return Err(LadderError::SolverDivergence {
                        iterations: self.config.max_iterations,
                    }
                    .into());
                }
            }
            a - f64::from(k) * tau
        };

        let mut bracket = Bracket {
            a,
            fa: objective(a),
            b,
            fb: objective(b),
        };

        for iteration in 0..self.config.max_iterations {
            if (bracket.b - bracket.a).abs() <= self.config.convergence_tolerance {
                trace!(iteration, root = bracket.a, "volatility solve converged");
                return Ok((bracket.a / 2.0).exp());
            }
            bracket = Self::illinois_step(&objective, bracket);
        }

        Err(LadderError::SolverDivergence {
            iterations: self.config.max_iterations,
        }
        .into())
    }

    /// One Illinois step: regula-falsi interpolation, with the retained
    /// endpoint's value halved when the new point falls on its side.
    fn illinois_step(objective: &impl Fn(f64) -> f64, bracket: Bracket) -> Bracket {
        let Bracket { a, fa, b, fb } = bracket;
        let c = a + (a - b) * fa / (fb - fa);
        let fc = objective(c);

        if fc * fb < 0.0 {
            Bracket {
                a: b,
                fa: fb,
                b: c,
                fb: fc,
            }
        } else {
            Bracket {
                a,
                fa: fa / 2.0,
                b: c,
                fb: fc,
            }
        }
    }
}
