//! ELO rating ladders
//!
//! Standard logistic expectation against the mean opponent rating, K=32,
//! newcomers at 1000, floored at zero. The scoreboard keeps three
//! independent ladders (overall, predator, defender); ratings never move
//! between them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Rating assigned to players never seen before
pub const ELO_INITIAL: f64 = 1000.0;
/// Maximum rating swing for a single game
pub const ELO_K_FACTOR: f64 = 32.0;

/// One independent rating ladder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EloLadder {
    ratings: HashMap<String, f64>,
}

impl EloLadder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rating, [`ELO_INITIAL`] for unknown players
    pub fn rating(&self, player: &str) -> f64 {
        self.ratings.get(player).copied().unwrap_or(ELO_INITIAL)
    }

    /// Ratings for a set of players, in the given order
    pub fn ratings_for(&self, players: &[String]) -> Vec<f64> {
        players.iter().map(|p| self.rating(p)).collect()
    }

    /// Rating change for a result against the given opponents.
    ///
    /// Expectation is computed against the mean opponent rating. No
    /// opponents carries no information, so the delta is zero. The ladder
    /// is not modified; pair with [`EloLadder::apply`].
    pub fn delta(&self, player: &str, won: bool, opponent_ratings: &[f64]) -> f64 {
        if opponent_ratings.is_empty() {
            return 0.0;
        }
        let rating = self.rating(player);
        let mean_opponent =
            opponent_ratings.iter().sum::<f64>() / opponent_ratings.len() as f64;
        let expected = 1.0 / (1.0 + 10f64.powf((mean_opponent - rating) / 400.0));
        let actual = if won { 1.0 } else { 0.0 };
        ELO_K_FACTOR * (actual - expected)
    }

    /// Apply a delta and return the updated rating, floored at zero
    pub fn apply(&mut self, player: &str, delta: f64) -> f64 {
        let updated = (self.rating(player) + delta).max(0.0);
        self.ratings.insert(player.to_string(), updated);
        updated
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_player_starts_at_initial() {
        let ladder = EloLadder::new();
        assert_eq!(ladder.rating("nobody"), ELO_INITIAL);
        assert!(ladder.is_empty());
    }

    #[test]
    fn test_no_opponents_no_delta() {
        let ladder = EloLadder::new();
        assert_eq!(ladder.delta("alice", true, &[]), 0.0);
    }

    #[test]
    fn test_even_match_splits_k() {
        let ladder = EloLadder::new();
        let win = ladder.delta("alice", true, &[ELO_INITIAL]);
        let loss = ladder.delta("alice", false, &[ELO_INITIAL]);
        assert!((win - 16.0).abs() < 1e-9);
        assert!((loss + 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_upsets_pay_more() {
        let mut ladder = EloLadder::new();
        ladder.apply("strong", 200.0);
        ladder.apply("weak", -200.0);

        let vs_strong = ladder.delta("alice", true, &[ladder.rating("strong")]);
        let vs_weak = ladder.delta("alice", true, &[ladder.rating("weak")]);
        assert!(vs_strong > vs_weak);
        assert!(vs_strong > 16.0);
        assert!(vs_weak < 16.0);
    }

    #[test]
    fn test_mean_of_opponents() {
        let ladder = EloLadder::new();
        // 900 and 1100 average to an even match
        let delta = ladder.delta("alice", true, &[900.0, 1100.0]);
        assert!((delta - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_floors_at_zero() {
        let mut ladder = EloLadder::new();
        ladder.apply("alice", -(ELO_INITIAL + 50.0));
        assert_eq!(ladder.rating("alice"), 0.0);
    }

    #[test]
    fn test_apply_updates_rating() {
        let mut ladder = EloLadder::new();
        let updated = ladder.apply("alice", 24.0);
        assert_eq!(updated, 1024.0);
        assert_eq!(ladder.rating("alice"), 1024.0);
        assert_eq!(ladder.len(), 1);
    }
}
