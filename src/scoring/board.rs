//! Cross-game scoreboard
//!
//! Accumulates scored games into per-participant standings and three
//! independent ELO ladders (overall, predator, defender). All state sits
//! behind one mutex; [`Scoreboard::record_game`] is a single atomic update,
//! so concurrent games cannot interleave partial results.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::roles::{Role, Team, Winner};
use crate::scoring::elo::EloLadder;
use crate::scoring::metrics::PlayerMetrics;
use crate::scoring::{PlayerScore, ScoringEngine};

/// Shared handle used by concurrent game sessions
pub type SharedScoreboard = Arc<Scoreboard>;

/// Archived outcome of one recorded game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub recorded_at: DateTime<Utc>,
    pub winner: Winner,
    pub rounds: u32,
    pub predators: Vec<String>,
    pub defenders: Vec<String>,
    pub scores: Vec<PlayerScore>,
}

/// Cross-game standings for one participant, derived on read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub participant: String,
    pub elo_rating: f64,
    pub predator_elo: f64,
    pub defender_elo: f64,
    pub games_played: u32,
    pub win_rate: f64,
    pub aggregate_score: f64,
    pub avg_survival_rounds: f64,
    pub correct_vote_rate: f64,
    pub influence_score: f64,
    pub consistency_score: f64,
    pub sabotage_penalty: f64,
    // Predator-side standings
    pub games_as_predator: u32,
    pub predator_win_rate: f64,
    pub deception_score: f64,
    pub eliminations_per_game: f64,
    // Defender-side standings
    pub games_as_defender: u32,
    pub defender_win_rate: f64,
    pub detection_score: f64,
    pub accusation_accuracy: f64,
    pub investigation_accuracy: f64,
    pub games_as_seer: u32,
    pub protection_success_rate: f64,
    pub games_as_doctor: u32,
}

/// Running sums folded in as games are recorded
#[derive(Debug, Clone, Default)]
struct Tally {
    games_played: u32,
    wins: u32,
    survival_rounds_sum: u32,
    correct_votes: u32,
    votes_counted: u32,
    aggregate_sum: f64,
    influence_sum: f64,
    consistency_sum: f64,
    sabotage_sum: f64,
    successful_accusations: u32,
    accusations_total: u32,
    games_as_predator: u32,
    predator_wins: u32,
    deception_sum: f64,
    eliminations: u32,
    games_as_defender: u32,
    defender_wins: u32,
    detection_sum: f64,
    games_as_seer: u32,
    investigations_correct: u32,
    investigations_total: u32,
    games_as_doctor: u32,
    protections_successful: u32,
    protections_total: u32,
}

impl Tally {
    fn absorb(&mut self, metrics: &PlayerMetrics, score: &PlayerScore) {
        self.games_played += 1;
        if metrics.won {
            self.wins += 1;
        }
        self.survival_rounds_sum += metrics.rounds_survived;
        self.correct_votes += metrics.correct_votes;
        self.votes_counted += metrics.correct_votes + metrics.wrong_votes;
        self.aggregate_sum += score.dimension("aggregate_score");
        self.influence_sum += score.dimension("influence_score");
        self.consistency_sum += score.dimension("consistency_score");
        self.sabotage_sum += score.dimension("sabotage_score");
        self.successful_accusations += metrics.successful_accusations;
        self.accusations_total += metrics.successful_accusations + metrics.failed_accusations;

        match metrics.team {
            Team::Predators => {
                self.games_as_predator += 1;
                if metrics.won {
                    self.predator_wins += 1;
                }
                self.deception_sum += score.dimension("deception_score");
                self.eliminations += metrics.eliminations_credited;
            }
            Team::Defenders => {
                self.games_as_defender += 1;
                if metrics.won {
                    self.defender_wins += 1;
                }
                self.detection_sum += score.dimension("detection_score");
            }
        }

        match metrics.role {
            Role::Seer => {
                self.games_as_seer += 1;
                self.investigations_correct += metrics.investigations_correct;
                self.investigations_total += metrics.investigations_total;
            }
            Role::Doctor => {
                self.games_as_doctor += 1;
                self.protections_successful += metrics.protections_successful;
                self.protections_total += metrics.protections_total;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    overall: EloLadder,
    predator: EloLadder,
    defender: EloLadder,
    tallies: HashMap<String, Tally>,
    games: Vec<GameRecord>,
}

/// Persistent standings across every recorded game
#[derive(Debug, Default)]
pub struct Scoreboard {
    scoring: ScoringEngine,
    inner: Mutex<BoardState>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedScoreboard {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fold one finished game into the standings.
    ///
    /// Rates every player on the overall ladder and on the ladder of the
    /// role they played, against the opposing team's ratings. All deltas
    /// come from the pre-game snapshot, so order within the batch cannot
    /// matter. Returns the per-player scores with overall deltas attached.
    pub fn record_game(
        &self,
        game_id: &str,
        winner: Winner,
        total_rounds: u32,
        metrics: &[PlayerMetrics],
    ) -> Vec<PlayerScore> {
        let mut state = self.lock();

        let predators: Vec<String> = metrics
            .iter()
            .filter(|m| m.team == Team::Predators)
            .map(|m| m.player_name.clone())
            .collect();
        let defenders: Vec<String> = metrics
            .iter()
            .filter(|m| m.team == Team::Defenders)
            .map(|m| m.player_name.clone())
            .collect();

        let deltas: Vec<(f64, f64)> = metrics
            .iter()
            .map(|m| {
                let opponents = match m.team {
                    Team::Predators => &defenders,
                    Team::Defenders => &predators,
                };
                let overall_delta = state.overall.delta(
                    &m.player_name,
                    m.won,
                    &state.overall.ratings_for(opponents),
                );
                let ladder = match m.team {
                    Team::Predators => &state.predator,
                    Team::Defenders => &state.defender,
                };
                let role_delta =
                    ladder.delta(&m.player_name, m.won, &ladder.ratings_for(opponents));
                (overall_delta, role_delta)
            })
            .collect();

        for (m, (overall_delta, role_delta)) in metrics.iter().zip(&deltas) {
            state.overall.apply(&m.player_name, *overall_delta);
            match m.team {
                Team::Predators => state.predator.apply(&m.player_name, *role_delta),
                Team::Defenders => state.defender.apply(&m.player_name, *role_delta),
            };
        }

        let total_players = metrics.len();
        let mut scores = Vec::with_capacity(metrics.len());
        for (m, (overall_delta, _)) in metrics.iter().zip(&deltas) {
            let score =
                self.scoring
                    .score_player(m, total_rounds, total_players, Some(*overall_delta));
            state
                .tallies
                .entry(m.player_name.clone())
                .or_default()
                .absorb(m, &score);
            scores.push(score);
        }

        state.games.push(GameRecord {
            game_id: game_id.to_string(),
            recorded_at: Utc::now(),
            winner,
            rounds: total_rounds,
            predators,
            defenders,
            scores: scores.clone(),
        });

        debug!(
            game_id,
            winner = %winner,
            players = total_players,
            "scoreboard updated"
        );
        scores
    }

    /// Standings for one participant, `None` before their first game
    pub fn participant(&self, name: &str) -> Option<ParticipantResult> {
        let state = self.lock();
        state
            .tallies
            .get(name)
            .map(|tally| derive_result(name, tally, &state))
    }

    /// Standings for the given players in the given order, skipping
    /// anyone with no recorded games
    pub fn results_for(&self, players: &[String]) -> Vec<ParticipantResult> {
        let state = self.lock();
        players
            .iter()
            .filter_map(|name| {
                state
                    .tallies
                    .get(name.as_str())
                    .map(|tally| derive_result(name, tally, &state))
            })
            .collect()
    }

    /// All participants, best overall rating first
    pub fn leaderboard(&self) -> Vec<ParticipantResult> {
        let state = self.lock();
        let mut results: Vec<ParticipantResult> = state
            .tallies
            .iter()
            .map(|(name, tally)| derive_result(name, tally, &state))
            .collect();
        results.sort_by(|a, b| {
            b.elo_rating
                .total_cmp(&a.elo_rating)
                .then_with(|| a.participant.cmp(&b.participant))
        });
        results
    }

    pub fn games(&self) -> Vec<GameRecord> {
        self.lock().games.clone()
    }

    pub fn games_recorded(&self) -> usize {
        self.lock().games.len()
    }

    /// Discard all standings, ladders, and archived games
    pub fn reset(&self) {
        *self.lock() = BoardState::default();
    }
}

fn derive_result(name: &str, tally: &Tally, state: &BoardState) -> ParticipantResult {
    let games = tally.games_played as f64;
    ParticipantResult {
        participant: name.to_string(),
        elo_rating: state.overall.rating(name),
        predator_elo: state.predator.rating(name),
        defender_elo: state.defender.rating(name),
        games_played: tally.games_played,
        win_rate: ratio(tally.wins as f64, games),
        aggregate_score: ratio(tally.aggregate_sum, games),
        avg_survival_rounds: ratio(tally.survival_rounds_sum as f64, games),
        correct_vote_rate: ratio(tally.correct_votes as f64, tally.votes_counted as f64),
        influence_score: ratio(tally.influence_sum, games),
        consistency_score: ratio(tally.consistency_sum, games),
        sabotage_penalty: ratio(tally.sabotage_sum, games),
        games_as_predator: tally.games_as_predator,
        predator_win_rate: ratio(tally.predator_wins as f64, tally.games_as_predator as f64),
        deception_score: ratio(tally.deception_sum, tally.games_as_predator as f64),
        eliminations_per_game: ratio(tally.eliminations as f64, tally.games_as_predator as f64),
        games_as_defender: tally.games_as_defender,
        defender_win_rate: ratio(tally.defender_wins as f64, tally.games_as_defender as f64),
        detection_score: ratio(tally.detection_sum, tally.games_as_defender as f64),
        accusation_accuracy: ratio(
            tally.successful_accusations as f64,
            tally.accusations_total as f64,
        ),
        investigation_accuracy: ratio(
            tally.investigations_correct as f64,
            tally.investigations_total as f64,
        ),
        games_as_seer: tally.games_as_seer,
        protection_success_rate: ratio(
            tally.protections_successful as f64,
            tally.protections_total as f64,
        ),
        games_as_doctor: tally.games_as_doctor,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::elo::ELO_INITIAL;

    /// Five players, predators win in round 3
    fn predator_win_game() -> Vec<PlayerMetrics> {
        let mut wolfie = PlayerMetrics::new("wolfie", Role::Predator);
        wolfie.eliminations_credited = 2;
        wolfie.finalize(Winner::Predators, true, 3);

        let mut oracle = PlayerMetrics::new("oracle", Role::Seer);
        oracle.investigations_correct = 1;
        oracle.investigations_total = 2;
        oracle.correct_votes = 1;
        oracle.finalize(Winner::Predators, false, 2);

        let mut medic = PlayerMetrics::new("medic", Role::Doctor);
        medic.protections_total = 2;
        medic.finalize(Winner::Predators, true, 3);

        let mut bob = PlayerMetrics::new("bob", Role::Defender);
        bob.wrong_votes = 1;
        bob.finalize(Winner::Predators, false, 1);

        let mut carol = PlayerMetrics::new("carol", Role::Defender);
        carol.finalize(Winner::Predators, true, 3);

        vec![wolfie, oracle, medic, bob, carol]
    }

    #[test]
    fn test_record_game_returns_scores_in_input_order() {
        let board = Scoreboard::new();
        let scores = board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0].player_name, "wolfie");
        assert_eq!(scores[4].player_name, "carol");
        assert!(scores[0].won);
        assert!(!scores[1].won);
        assert_eq!(board.games_recorded(), 1);
    }

    #[test]
    fn test_winners_gain_losers_lose() {
        let board = Scoreboard::new();
        let scores = board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        for score in &scores {
            let delta = score.elo_delta.unwrap();
            if score.won {
                assert!(delta > 0.0, "{} should gain", score.player_name);
            } else {
                assert!(delta < 0.0, "{} should lose", score.player_name);
            }
        }

        let wolfie = board.participant("wolfie").unwrap();
        assert!(wolfie.elo_rating > ELO_INITIAL);
        let oracle = board.participant("oracle").unwrap();
        assert!(oracle.elo_rating < ELO_INITIAL);
    }

    #[test]
    fn test_role_ladders_stay_independent() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        let oracle = board.participant("oracle").unwrap();
        // Oracle played defender, so the predator ladder never saw them
        assert!(oracle.defender_elo < ELO_INITIAL);
        assert_eq!(oracle.predator_elo, ELO_INITIAL);

        let wolfie = board.participant("wolfie").unwrap();
        assert!(wolfie.predator_elo > ELO_INITIAL);
        assert_eq!(wolfie.defender_elo, ELO_INITIAL);
    }

    #[test]
    fn test_standings_accumulate_across_games() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());
        board.record_game("g2", Winner::Predators, 3, &predator_win_game());

        let wolfie = board.participant("wolfie").unwrap();
        assert_eq!(wolfie.games_played, 2);
        assert_eq!(wolfie.games_as_predator, 2);
        assert_eq!(wolfie.win_rate, 1.0);
        assert_eq!(wolfie.predator_win_rate, 1.0);
        assert_eq!(wolfie.eliminations_per_game, 2.0);
        assert_eq!(wolfie.avg_survival_rounds, 3.0);

        let medic = board.participant("medic").unwrap();
        assert_eq!(medic.games_as_doctor, 2);
        assert_eq!(medic.protection_success_rate, 0.0);
        assert_eq!(medic.win_rate, 0.0);
    }

    #[test]
    fn test_unplayed_denominators_read_zero() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        // Carol cast no votes and held no special role
        let carol = board.participant("carol").unwrap();
        assert_eq!(carol.correct_vote_rate, 0.0);
        assert_eq!(carol.investigation_accuracy, 0.0);
        assert_eq!(carol.protection_success_rate, 0.0);
        assert_eq!(carol.games_as_predator, 0);
        assert_eq!(carol.predator_win_rate, 0.0);
    }

    #[test]
    fn test_unknown_participant_is_none() {
        let board = Scoreboard::new();
        assert!(board.participant("nobody").is_none());
    }

    #[test]
    fn test_results_for_keeps_roster_order() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        let roster = vec![
            "carol".to_string(),
            "stranger".to_string(),
            "wolfie".to_string(),
        ];
        let results = board.results_for(&roster);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].participant, "carol");
        assert_eq!(results[1].participant, "wolfie");
    }

    #[test]
    fn test_leaderboard_sorted_by_rating() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());

        let leaderboard = board.leaderboard();
        assert_eq!(leaderboard.len(), 5);
        for pair in leaderboard.windows(2) {
            assert!(pair[0].elo_rating >= pair[1].elo_rating);
        }
        // Winners ahead of losers after one game
        assert!(leaderboard[0].win_rate > 0.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let board = Scoreboard::new();
        board.record_game("g1", Winner::Predators, 3, &predator_win_game());
        board.reset();

        assert_eq!(board.games_recorded(), 0);
        assert!(board.participant("wolfie").is_none());
        assert!(board.leaderboard().is_empty());
    }

    #[test]
    fn test_concurrent_recording_loses_nothing() {
        let board = Scoreboard::shared();
        let mut handles = Vec::new();
        for t in 0..8 {
            let board = Arc::clone(&board);
            handles.push(std::thread::spawn(move || {
                for g in 0..5 {
                    let id = format!("g{t}-{g}");
                    board.record_game(&id, Winner::Predators, 3, &predator_win_game());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(board.games_recorded(), 40);
        let wolfie = board.participant("wolfie").unwrap();
        assert_eq!(wolfie.games_played, 40);
    }
}
