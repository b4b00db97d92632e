//! Per-player, per-game performance counters
//!
//! One [`PlayerMetrics`] is created per participant at game start, mutated
//! as play progresses, and finalized exactly once when the winner is known.
//! Counters only ever increment; nothing here is derived.

use serde::{Deserialize, Serialize};

use crate::protocol::ActionKind;
use crate::roles::{Role, Team, Winner};

/// Raw counters for one player in one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMetrics {
    pub player_name: String,
    pub role: Role,
    pub team: Team,

    // Game outcome
    pub won: bool,
    pub survived: bool,
    pub rounds_survived: u32,

    // Action counts
    pub debate_turns: u32,
    pub votes_cast: u32,
    /// Votes against actual enemies
    pub correct_votes: u32,
    /// Votes against teammates
    pub wrong_votes: u32,

    // Influence tracking
    pub times_voted_against: u32,
    /// Votes that helped exile an enemy
    pub successful_accusations: u32,
    /// Votes that helped exile a teammate
    pub failed_accusations: u32,

    // Role-specific counters
    pub investigations_correct: u32,
    pub investigations_total: u32,
    pub protections_successful: u32,
    pub protections_total: u32,
    /// Night kills credited to every predator alive at the time
    pub eliminations_credited: u32,

    // How well the table read this player
    pub times_suspected_correctly: u32,
    pub times_suspected_wrongly: u32,

    /// Actions that worked against the player's own side
    pub sabotage_actions: u32,
}

impl PlayerMetrics {
    pub fn new(player_name: impl Into<String>, role: Role) -> Self {
        Self {
            player_name: player_name.into(),
            role,
            team: role.team(),
            won: false,
            survived: false,
            rounds_survived: 0,
            debate_turns: 0,
            votes_cast: 0,
            correct_votes: 0,
            wrong_votes: 0,
            times_voted_against: 0,
            successful_accusations: 0,
            failed_accusations: 0,
            investigations_correct: 0,
            investigations_total: 0,
            protections_successful: 0,
            protections_total: 0,
            eliminations_credited: 0,
            times_suspected_correctly: 0,
            times_suspected_wrongly: 0,
            sabotage_actions: 0,
        }
    }

    /// Seal the outcome fields once the winner is decided
    pub fn finalize(&mut self, winner: Winner, survived: bool, rounds: u32) {
        self.won = winner.team() == Some(self.team);
        self.survived = survived;
        self.rounds_survived = rounds;
    }
}

/// Whether an action works against the actor's own side
pub fn detect_sabotage(action: ActionKind, actor: Team, target: Option<Team>) -> bool {
    match (action, target) {
        (ActionKind::Vote, Some(target)) => actor == target,
        (ActionKind::Eliminate, Some(target)) => {
            actor == Team::Predators && target == Team::Predators
        }
        _ => false,
    }
}
