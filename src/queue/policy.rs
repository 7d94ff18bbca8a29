//! Match formation policies
//!
//! Two policies are in use and deliberately kept distinct: anchor
//! expansion for N-player party modes (first anchor to fill its window
//! commits) and best-pair for the 1v1 ladder (global minimum rating
//! difference commits). Their commit rules differ and are observable
//! behavior, so there is no unified general policy.
//!
//! Both policies apply the newbie/veteran pool partition as a hard
//! filter before any window comparison, and both use compatibility
//! windows that only ever widen as tickets wait.

use crate::queue::ticket::MatchTicket;
use crate::utils::rating_difference;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A policy selects the tickets forming one match from a mode's pool
pub trait MatchPolicy: Send + Sync {
    /// Return the indices of tickets to commit as one match, or `None`
    /// when no qualifying group exists. Implementations must never
    /// return the same index twice.
    fn select(
        &self,
        tickets: &[MatchTicket],
        required_size: usize,
        now: DateTime<Utc>,
    ) -> Option<Vec<usize>>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Compatibility window that widens in discrete steps with wait time
fn expanded_window(
    initial_window: f64,
    growth_per_interval: f64,
    growth_interval_seconds: u64,
    waited: Duration,
) -> f64 {
    let steps = (waited.num_seconds().max(0) as u64) / growth_interval_seconds;
    initial_window + steps as f64 * growth_per_interval
}

/// Hard pool partition: newbies only ever compare against newbies
fn same_pool(a: &MatchTicket, b: &MatchTicket, newbie_game_limit: u32) -> bool {
    a.is_newbie(newbie_game_limit) == b.is_newbie(newbie_game_limit)
}

/// Configuration for [`AnchorExpansionPolicy`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorPolicyConfig {
    /// Rating window granted to a ticket that just arrived
    pub initial_window: f64,
    /// Window widening per full growth interval waited
    pub growth_per_interval: f64,
    /// Length of one growth interval in seconds
    pub growth_interval_seconds: u64,
    /// Tickets with fewer completed games than this are newbies
    pub newbie_game_limit: u32,
}

impl Default for AnchorPolicyConfig {
    fn default() -> Self {
        Self {
            initial_window: 80.0,
            growth_per_interval: 40.0,
            growth_interval_seconds: 20,
            newbie_game_limit: 10,
        }
    }
}

impl AnchorPolicyConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_window_config(
            self.initial_window,
            self.growth_per_interval,
            self.growth_interval_seconds,
        )
    }
}

/// Configuration for [`BestPairPolicy`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BestPairPolicyConfig {
    pub initial_window: f64,
    pub growth_per_interval: f64,
    pub growth_interval_seconds: u64,
    pub newbie_game_limit: u32,
}

impl Default for BestPairPolicyConfig {
    fn default() -> Self {
        Self {
            initial_window: 80.0,
            growth_per_interval: 20.0,
            growth_interval_seconds: 5,
            newbie_game_limit: 10,
        }
    }
}

impl BestPairPolicyConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_window_config(
            self.initial_window,
            self.growth_per_interval,
            self.growth_interval_seconds,
        )
    }
}

fn validate_window_config(
    initial_window: f64,
    growth_per_interval: f64,
    growth_interval_seconds: u64,
) -> crate::error::Result<()> {
    if initial_window < 0.0 {
        return Err(crate::error::LadderError::ConfigurationError {
            message: "initial_window must be non-negative".to_string(),
        }
        .into());
    }

    if growth_per_interval < 0.0 {
        return Err(crate::error::LadderError::ConfigurationError {
            message: "growth_per_interval must be non-negative (windows never shrink)".to_string(),
        }
        .into());
    }

    if growth_interval_seconds == 0 {
        return Err(crate::error::LadderError::ConfigurationError {
            message: "growth_interval_seconds must be greater than zero".to_string(),
        }
        .into());
    }

    Ok(())
}

/// N-player policy: scan anchors in enqueue order, greedily fill from
/// the anchor's window, commit the first anchor that reaches the
/// requested size.
#[derive(Debug, Clone, Default)]
pub struct AnchorExpansionPolicy {
    config: AnchorPolicyConfig,
}

impl AnchorExpansionPolicy {
    pub fn new(config: AnchorPolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnchorPolicyConfig {
        &self.config
    }
}

impl MatchPolicy for AnchorExpansionPolicy {
    fn select(
        &self,
        tickets: &[MatchTicket],
        required_size: usize,
        now: DateTime<Utc>,
    ) -> Option<Vec<usize>> {
        if required_size == 0 || tickets.len() < required_size {
            return None;
        }

        // Oldest tickets anchor first
        let mut order: Vec<usize> = (0..tickets.len()).collect();
        order.sort_by_key(|&i| tickets[i].enqueued_at);

        for &anchor_idx in &order {
            let anchor = &tickets[anchor_idx];
            let window = expanded_window(
                self.config.initial_window,
                self.config.growth_per_interval,
                self.config.growth_interval_seconds,
                anchor.wait_time(now),
            );

            let mut group = vec![anchor_idx];
            for &other_idx in &order {
                if group.len() == required_size {
                    break;
                }
                if other_idx == anchor_idx {
                    continue;
                }

                let other = &tickets[other_idx];
                if !same_pool(anchor, other, self.config.newbie_game_limit) {
                    continue;
                }

                if rating_difference(other.rating, anchor.rating) <= window {
                    group.push(other_idx);
                }
            }

            if group.len() == required_size {
                debug!(
                    anchor = %anchor.player_id,
                    window,
                    size = required_size,
                    "anchor filled its window"
                );
                return Some(group);
            }
        }

        None
    }

    fn name(&self) -> &'static str {
        "anchor_expansion"
    }
}

/// 1v1 policy: among all same-pool pairs within the wait-scaled window,
/// commit the pair with the smallest rating difference.
#[derive(Debug, Clone, Default)]
pub struct BestPairPolicy {
    config: BestPairPolicyConfig,
}

impl BestPairPolicy {
    pub fn new(config: BestPairPolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BestPairPolicyConfig {
        &self.config
    }
}

impl MatchPolicy for BestPairPolicy {
    fn select(
        &self,
        tickets: &[MatchTicket],
        required_size: usize,
        now: DateTime<Utc>,
    ) -> Option<Vec<usize>> {
        if required_size != 2 {
            debug!(
                required_size,
                "best-pair policy only forms matches of two"
            );
            return None;
        }

        if tickets.len() < 2 {
            return None;
        }

        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..tickets.len() {
            for j in (i + 1)..tickets.len() {
                let (a, b) = (&tickets[i], &tickets[j]);
                if !same_pool(a, b, self.config.newbie_game_limit) {
                    continue;
                }

                let diff = rating_difference(a.rating, b.rating);
                let shared_wait = a.wait_time(now).min(b.wait_time(now));
                let window = expanded_window(
                    self.config.initial_window,
                    self.config.growth_per_interval,
                    self.config.growth_interval_seconds,
                    shared_wait,
                );

                if diff <= window && best.map_or(true, |(_, _, d)| diff < d) {
                    best = Some((i, j, diff));
                }
            }
        }

        best.map(|(i, j, diff)| {
            debug!(diff, "best pair selected");
            vec![i, j]
        })
    }

    fn name(&self) -> &'static str {
        "best_pair"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;

    fn ticket(id: &str, rating: f64, experience: u32) -> MatchTicket {
        MatchTicket::new(id, rating, "test_mode", experience)
    }

    fn waited(ticket: MatchTicket, seconds: i64) -> MatchTicket {
        let backdated = current_timestamp() - Duration::seconds(seconds);
        ticket.enqueued_at(backdated)
    }

    #[test]
    fn test_expanded_window_steps() {
        assert_eq!(expanded_window(80.0, 40.0, 20, Duration::seconds(0)), 80.0);
        assert_eq!(expanded_window(80.0, 40.0, 20, Duration::seconds(19)), 80.0);
        assert_eq!(expanded_window(80.0, 40.0, 20, Duration::seconds(20)), 120.0);
        assert_eq!(expanded_window(80.0, 40.0, 20, Duration::seconds(45)), 160.0);
    }

    #[test]
    fn test_anchor_matches_within_initial_window() {
        let policy = AnchorExpansionPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            ticket("a", 1500.0, 20),
            ticket("b", 1540.0, 20),
        ];

        let group = policy.select(&tickets, 2, now).unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_anchor_needs_full_group() {
        let policy = AnchorExpansionPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            ticket("a", 1500.0, 20),
            ticket("b", 1520.0, 20),
            ticket("c", 2400.0, 20),
        ];

        // Only two compatible tickets for a 3-player match
        assert!(policy.select(&tickets, 3, now).is_none());
    }

    #[test]
    fn test_anchor_window_expands_with_wait() {
        let policy = AnchorExpansionPolicy::default();
        let now = current_timestamp();

        // 120 apart: outside the 80 initial window, inside 80+40
        let fresh = vec![ticket("a", 1500.0, 20), ticket("b", 1620.0, 20)];
        assert!(policy.select(&fresh, 2, now).is_none());

        let old = vec![
            waited(ticket("a", 1500.0, 20), 45),
            ticket("b", 1620.0, 20),
        ];
        assert!(policy.select(&old, 2, now).is_some());
    }

    #[test]
    fn test_anchor_respects_pool_partition() {
        let policy = AnchorExpansionPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            waited(ticket("newbie", 1500.0, 2), 600),
            waited(ticket("veteran", 1500.0, 50), 600),
        ];

        assert!(policy.select(&tickets, 2, now).is_none());
    }

    #[test]
    fn test_anchor_commits_first_success_in_enqueue_order() {
        let policy = AnchorExpansionPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            waited(ticket("oldest", 1500.0, 20), 30),
            waited(ticket("mid", 1510.0, 20), 20),
            waited(ticket("newest", 1505.0, 20), 10),
        ];

        let group = policy.select(&tickets, 2, now).unwrap();
        // The oldest ticket anchors and takes the next in order, not
        // the closest rating
        assert_eq!(group[0], 0);
        assert_eq!(group[1], 1);
    }

    #[test]
    fn test_best_pair_picks_minimum_difference() {
        let policy = BestPairPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            ticket("a", 1500.0, 20),
            ticket("b", 1560.0, 20),
            ticket("c", 1510.0, 20),
        ];

        let group = policy.select(&tickets, 2, now).unwrap();
        assert_eq!(group, vec![0, 2]);
    }

    #[test]
    fn test_best_pair_rejects_other_sizes() {
        let policy = BestPairPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            ticket("a", 1500.0, 20),
            ticket("b", 1500.0, 20),
            ticket("c", 1500.0, 20),
        ];

        assert!(policy.select(&tickets, 3, now).is_none());
        assert!(policy.select(&tickets, 2, now).is_some());
    }

    #[test]
    fn test_best_pair_window_uses_shared_wait() {
        let policy = BestPairPolicy::default();
        let now = current_timestamp();

        // 90 apart with base window 80: needs one 5s growth step, and
        // the newer ticket's wait is what counts
        let tickets = vec![
            waited(ticket("a", 1000.0, 20), 60),
            ticket("b", 1090.0, 20),
        ];
        assert!(policy.select(&tickets, 2, now).is_none());

        let both_waited = vec![
            waited(ticket("a", 1000.0, 20), 60),
            waited(ticket("b", 1090.0, 20), 15),
        ];
        assert!(policy.select(&both_waited, 2, now).is_some());
    }

    #[test]
    fn test_best_pair_respects_pool_partition() {
        let policy = BestPairPolicy::default();
        let now = current_timestamp();
        let tickets = vec![
            waited(ticket("new", 1000.0, 2), 3600),
            waited(ticket("old", 1000.0, 20), 3600),
        ];

        assert!(policy.select(&tickets, 2, now).is_none());
    }
}
