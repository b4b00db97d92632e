//! Multi-dimensional performance scoring
//!
//! Converts the raw [`PlayerMetrics`] counters collected during a game into
//! normalized per-dimension scores, a weighted aggregate, and persistent
//! ELO ratings. Components:
//!
//! - [`ScoringEngine`]: stateless dimension calculators and weights
//! - [`EloLadder`]: one independent rating ladder
//! - [`Scoreboard`]: cross-game accumulator behind a mutex
//! - [`GameReport`]: the full outcome of one orchestrated game
//!
//! Every dimension lands in `[0, 1]`. Sabotage is a penalty, subtracted
//! from the weighted sum before the final clamp.

pub mod board;
pub mod elo;
pub mod metrics;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::GameLogEntry;
use crate::protocol::DebateEntry;
use crate::roles::{Role, Team, Winner};

pub use board::{GameRecord, ParticipantResult, Scoreboard, SharedScoreboard};
pub use elo::{EloLadder, ELO_INITIAL, ELO_K_FACTOR};
pub use metrics::{detect_sabotage, PlayerMetrics};

/// Weight of winning the game
pub const WEIGHT_WIN: f64 = 0.30;
/// Weight of staying alive
pub const WEIGHT_SURVIVAL: f64 = 0.15;
/// Weight of predator tradecraft (predators only)
pub const WEIGHT_DECEPTION: f64 = 0.20;
/// Weight of finding predators (defenders only)
pub const WEIGHT_DETECTION: f64 = 0.20;
/// Weight of swaying the table
pub const WEIGHT_INFLUENCE: f64 = 0.15;
/// Weight of playing one's own win condition
pub const WEIGHT_CONSISTENCY: f64 = 0.10;
/// Penalty weight for working against one's own side
pub const WEIGHT_SABOTAGE: f64 = 0.20;

/// Debate turns treated as full participation
const EXPECTED_DEBATE_TURNS: f64 = 5.0;

/// Scored outcome for one player in one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_name: String,
    pub role: Role,
    pub team: Team,
    pub won: bool,
    pub survived: bool,
    pub rounds_survived: u32,
    /// Keyed by dimension name, `aggregate_score` included
    pub dimensions: HashMap<String, f64>,
    /// Overall-ladder rating change, when rated
    pub elo_delta: Option<f64>,
}

impl PlayerScore {
    /// Dimension value by name, zero when absent
    pub fn dimension(&self, name: &str) -> f64 {
        self.dimensions.get(name).copied().unwrap_or(0.0)
    }

    pub fn aggregate(&self) -> f64 {
        self.dimension("aggregate_score")
    }
}

/// Stateless dimension calculators
///
/// Deception applies only to predators and detection only to defenders;
/// the other team's dimension is reported as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// 1.0 for a win, 0.0 otherwise
    pub fn win_score(&self, metrics: &PlayerMetrics) -> f64 {
        if metrics.won {
            1.0
        } else {
            0.0
        }
    }

    /// Fraction of the game survived, +0.3 bonus for reaching the end
    pub fn survival_score(&self, metrics: &PlayerMetrics, total_rounds: u32) -> f64 {
        if total_rounds == 0 {
            return 0.0;
        }
        let base = metrics.rounds_survived as f64 / total_rounds as f64;
        let bonus = if metrics.survived { 0.3 } else { 0.0 };
        (base + bonus).min(1.0)
    }

    /// How well a predator avoided suspicion. Zero for defenders.
    ///
    /// Credits survival (0.4), drawing suspicion onto the wrong reasons
    /// (0.3, granted in full when never suspected at all), and night kills
    /// (0.1 each, capped at 0.3).
    pub fn deception_score(&self, metrics: &PlayerMetrics) -> f64 {
        if metrics.team != Team::Predators {
            return 0.0;
        }
        let mut score = 0.0;
        if metrics.survived {
            score += 0.4;
        }
        let suspicions = metrics.times_suspected_correctly + metrics.times_suspected_wrongly;
        if suspicions > 0 {
            score += 0.3 * metrics.times_suspected_wrongly as f64 / suspicions as f64;
        } else {
            score += 0.3;
        }
        if metrics.eliminations_credited > 0 {
            score += (0.1 * metrics.eliminations_credited as f64).min(0.3);
        }
        score.min(1.0)
    }

    /// How well a defender found predators. Zero for predators.
    ///
    /// Credits vote accuracy (0.4), accusation accuracy (0.3), and role
    /// skill (0.3): investigation accuracy for the seer, protection rate
    /// for the doctor, a small survival credit for everyone else.
    pub fn detection_score(&self, metrics: &PlayerMetrics) -> f64 {
        if metrics.team != Team::Defenders {
            return 0.0;
        }
        let mut score = 0.0;
        let votes = metrics.correct_votes + metrics.wrong_votes;
        if votes > 0 {
            score += 0.4 * metrics.correct_votes as f64 / votes as f64;
        }
        let accusations = metrics.successful_accusations + metrics.failed_accusations;
        if accusations > 0 {
            score += 0.3 * metrics.successful_accusations as f64 / accusations as f64;
        }
        if metrics.role == Role::Seer && metrics.investigations_total > 0 {
            score += 0.3 * metrics.investigations_correct as f64
                / metrics.investigations_total as f64;
        } else if metrics.role == Role::Doctor && metrics.protections_total > 0 {
            score += 0.3 * metrics.protections_successful as f64
                / metrics.protections_total as f64;
        } else {
            score += if metrics.survived { 0.2 } else { 0.1 };
        }
        score.min(1.0)
    }

    /// How much the player shaped the game
    ///
    /// Credits debate participation (0.4 at five turns), accusations that
    /// landed (0.15 each, capped at 0.3), and not being a vote magnet
    /// (up to 0.3, fading as votes pile up).
    pub fn influence_score(&self, metrics: &PlayerMetrics, total_players: usize) -> f64 {
        let mut score = 0.0;
        if metrics.debate_turns > 0 {
            let participation = (metrics.debate_turns as f64 / EXPECTED_DEBATE_TURNS).min(1.0);
            score += 0.4 * participation;
        }
        if metrics.successful_accusations > 0 {
            score += (0.15 * metrics.successful_accusations as f64).min(0.3);
        }
        if total_players > 0 {
            let target_rate =
                metrics.times_voted_against as f64 / (total_players as f64 * 2.0).max(1.0);
            score += (0.3 * (1.0 - target_rate)).max(0.0);
        }
        score.min(1.0)
    }

    /// How consistently the player pursued their own win condition
    ///
    /// Starts at 0.5, loses 0.1 per vote against a teammate (capped at
    /// 0.3), gains 0.2 for acting on the win condition: night kills for
    /// predators, correct votes for defenders.
    pub fn consistency_score(&self, metrics: &PlayerMetrics) -> f64 {
        let mut score = 0.5;
        if metrics.wrong_votes > 0 {
            score -= (0.1 * metrics.wrong_votes as f64).min(0.3);
        }
        match metrics.team {
            Team::Predators if metrics.eliminations_credited > 0 => score += 0.2,
            Team::Defenders if metrics.correct_votes > 0 => score += 0.2,
            _ => {}
        }
        score.clamp(0.0, 1.0)
    }

    /// 0.25 per action against the player's own side, capped at 1.0
    pub fn sabotage_penalty(&self, metrics: &PlayerMetrics) -> f64 {
        if metrics.sabotage_actions == 0 {
            return 0.0;
        }
        (0.25 * metrics.sabotage_actions as f64).min(1.0)
    }

    /// All dimensions plus the weighted aggregate, keyed by name
    pub fn dimension_scores(
        &self,
        metrics: &PlayerMetrics,
        total_rounds: u32,
        total_players: usize,
    ) -> HashMap<String, f64> {
        let win = self.win_score(metrics);
        let survival = self.survival_score(metrics, total_rounds);
        let influence = self.influence_score(metrics, total_players);
        let consistency = self.consistency_score(metrics);
        let sabotage = self.sabotage_penalty(metrics);
        let (deception, detection) = match metrics.team {
            Team::Predators => (self.deception_score(metrics), 0.0),
            Team::Defenders => (0.0, self.detection_score(metrics)),
        };

        let weighted = win * WEIGHT_WIN
            + survival * WEIGHT_SURVIVAL
            + deception * WEIGHT_DECEPTION
            + detection * WEIGHT_DETECTION
            + influence * WEIGHT_INFLUENCE
            + consistency * WEIGHT_CONSISTENCY
            - sabotage * WEIGHT_SABOTAGE;
        let aggregate = weighted.clamp(0.0, 1.0);

        HashMap::from([
            ("win_score".to_string(), win),
            ("survival_score".to_string(), survival),
            ("deception_score".to_string(), deception),
            ("detection_score".to_string(), detection),
            ("influence_score".to_string(), influence),
            ("consistency_score".to_string(), consistency),
            ("sabotage_score".to_string(), sabotage),
            ("aggregate_score".to_string(), aggregate),
        ])
    }

    /// Full scored outcome for one player
    pub fn score_player(
        &self,
        metrics: &PlayerMetrics,
        total_rounds: u32,
        total_players: usize,
        elo_delta: Option<f64>,
    ) -> PlayerScore {
        PlayerScore {
            player_name: metrics.player_name.clone(),
            role: metrics.role,
            team: metrics.team,
            won: metrics.won,
            survived: metrics.survived,
            rounds_survived: metrics.rounds_survived,
            dimensions: self.dimension_scores(metrics, total_rounds, total_players),
            elo_delta,
        }
    }
}

/// Everything the orchestrator hands back for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub task_id: String,
    pub winner: Winner,
    pub rounds_played: u32,
    /// Player name to agent endpoint
    pub participants: HashMap<String, String>,
    pub scores: Vec<PlayerScore>,
    /// Cross-game standings for this game's participants
    pub results: Vec<ParticipantResult>,
    pub aggregate_metrics: HashMap<String, f64>,
    pub game_log: Vec<GameLogEntry>,
    pub debate_transcript: Vec<DebateEntry>,
    /// Present when the game ended abnormally
    pub diagnostic: Option<String>,
}

impl GameReport {
    /// Report for a game that never produced a winner
    pub fn error(
        task_id: impl Into<String>,
        participants: HashMap<String, String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            winner: Winner::Error,
            rounds_played: 0,
            participants,
            scores: Vec::new(),
            results: Vec::new(),
            aggregate_metrics: HashMap::new(),
            game_log: Vec::new(),
            debate_transcript: Vec::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }
}
