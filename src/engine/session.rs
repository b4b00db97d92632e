//! The game session — one full game from connectivity probe to report
//!
//! A session owns everything for a single game: the RNG, the live state,
//! the per-player metrics, and the structured log. Remote failures never
//! abort a running game; they degrade to declined actions and the round
//! moves on. Only pre-game failures (bad config, unreachable agents, the
//! optional deadline) produce an error report.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::client::AgentClient;
use crate::engine::state::{GameConfig, GameLogEntry, GameState};
use crate::error::{ArbiterError, ArbiterResult};
use crate::events::{GameEvent, ProgressNote, SharedSink};
use crate::protocol::{match_option, ActionCall, ActionKind, ActionReply, Phase, RoleOffer};
use crate::roles::{
    action_context, assign_roles, game_rules, role_briefing, Role, RoleAssignments,
    RoleDistribution, Team, Winner,
};
use crate::scoring::{detect_sabotage, GameReport, PlayerMetrics, SharedScoreboard};
use crate::telemetry;

/// Speakers drawn for each day's debate
const DEBATE_SPEAKERS: usize = 5;
/// Statement preview length on progress notes
const PREVIEW_CHARS: usize = 100;

/// Orchestrates one game between remote agents
pub struct GameSession {
    task_id: String,
    /// Player name to agent endpoint
    participants: HashMap<String, String>,
    config: GameConfig,
    client: AgentClient,
    sink: SharedSink,
    scoreboard: SharedScoreboard,
    rng: ChaCha8Rng,
    /// Player names in lexicographic order; every per-player iteration
    /// walks this so a fixed seed replays identically
    roster: Vec<String>,
    distribution: RoleDistribution,
    assignments: RoleAssignments,
    state: GameState,
    metrics: HashMap<String, PlayerMetrics>,
    /// Round each fallen player left the game in
    fall_rounds: HashMap<String, u32>,
    game_log: Vec<GameLogEntry>,
}

impl GameSession {
    /// Validate the table and deal roles. The deal happens here so that a
    /// session is fully determined by its inputs before any network I/O.
    pub fn new(
        task_id: impl Into<String>,
        participants: HashMap<String, String>,
        config: GameConfig,
        client: AgentClient,
        sink: SharedSink,
        scoreboard: SharedScoreboard,
    ) -> ArbiterResult<Self> {
        config.validate()?;
        let distribution =
            RoleDistribution::for_player_count(participants.len()).ok_or_else(|| {
                ArbiterError::config(format!(
                    "unsupported player count {}",
                    participants.len()
                ))
            })?;

        let mut roster: Vec<String> = participants.keys().cloned().collect();
        roster.sort();

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let assignments = assign_roles(&roster, &mut rng)?;
        let metrics = assignments
            .iter()
            .map(|(name, role)| (name.to_string(), PlayerMetrics::new(name, role)))
            .collect();
        let state = GameState::new(roster.clone());

        Ok(Self {
            task_id: task_id.into(),
            participants,
            config,
            client,
            sink,
            scoreboard,
            rng,
            roster,
            distribution,
            assignments,
            state,
            metrics,
            fall_rounds: HashMap::new(),
            game_log: Vec::new(),
        })
    }

    /// Like [`GameSession::new`] with a generated task id, for callers
    /// that have none
    pub fn with_generated_id(
        participants: HashMap<String, String>,
        config: GameConfig,
        client: AgentClient,
        sink: SharedSink,
        scoreboard: SharedScoreboard,
    ) -> ArbiterResult<Self> {
        let task_id = format!("game-{}", &Uuid::new_v4().to_string()[..8]);
        Self::new(task_id, participants, config, client, sink, scoreboard)
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// The dealt roles for this session
    pub fn assignments(&self) -> &RoleAssignments {
        &self.assignments
    }

    /// Run the game to completion and return its report.
    ///
    /// Always returns a report; a game that cannot start or outlives the
    /// configured deadline comes back with [`Winner::Error`] and a
    /// diagnostic.
    pub async fn run(self) -> GameReport {
        let deadline = self.config.game_deadline;
        let task_id = self.task_id.clone();
        let participants = self.participants.clone();
        let span = telemetry::game_span(&task_id, self.roster.len());
        let started = Instant::now();
        let report = match deadline {
            None => self.play().instrument(span.clone()).await,
            Some(limit) => {
                match tokio::time::timeout(limit, self.play().instrument(span.clone())).await {
                    Ok(report) => report,
                    Err(_) => {
                        error!(task_id = %task_id, ?limit, "game deadline exceeded");
                        GameReport::error(task_id, participants, "game deadline exceeded")
                    }
                }
            }
        };
        telemetry::record_game_result(
            &span,
            report.winner,
            report.rounds_played,
            started.elapsed().as_millis() as u64,
        );
        report
    }

    async fn play(mut self) -> GameReport {
        let started = Instant::now();
        info!(
            task_id = %self.task_id,
            players = self.roster.len(),
            distribution = %self.distribution.summary(),
            "game session starting"
        );

        self.note("Verifying agent connectivity");
        let reachability = self
            .client
            .verify_connectivity(&self.participants, self.config.probe_timeout)
            .await;
        let mut unreachable: Vec<String> = reachability
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(player, _)| player.clone())
            .collect();
        unreachable.sort();
        if !unreachable.is_empty() {
            let diagnostic = ArbiterError::unreachable(unreachable).diagnostic();
            error!(task_id = %self.task_id, %diagnostic, "aborting before start");
            self.note(format!("Game aborted: {}", diagnostic));
            return GameReport::error(self.task_id.clone(), self.participants.clone(), diagnostic);
        }

        self.note("Assigning roles to players");
        self.game_log.push(GameLogEntry::RolesAssigned {
            roles: self.assignments.as_map().clone(),
        });
        self.deliver_role_offers().await;

        self.sink.publish(GameEvent::GameStart {
            game_id: self.task_id.clone(),
            players: self.roster.clone(),
            roles: self.assignments.as_map().clone(),
            timestamp: Utc::now(),
        });
        self.note(format!("Game starting with {} players", self.roster.len()));

        let mut winner = None;
        for round in 1..=self.config.max_rounds {
            self.state.round = round;
            self.state.clear_debate();
            self.note(format!("=== Round {} begins ===", round));

            let night = telemetry::phase_span(&self.task_id, round, Phase::Night);
            self.night_phase().instrument(night).await;
            if let Some(w) = self.check_winner() {
                winner = Some(w);
                break;
            }

            let day = telemetry::phase_span(&self.task_id, round, Phase::Day);
            self.debate_phase().instrument(day).await;
            let voting = telemetry::phase_span(&self.task_id, round, Phase::Voting);
            self.voting_phase().instrument(voting).await;
            if let Some(w) = self.check_winner() {
                winner = Some(w);
                break;
            }
        }

        // Round limit reached: surviving predators take the game
        let winner = winner.unwrap_or_else(|| {
            if self.alive_predators().is_empty() {
                Winner::Defenders
            } else {
                Winner::Predators
            }
        });

        self.finalize(winner, started)
    }

    /// Deliver every role offer in parallel. A failed delivery costs that
    /// player their briefing, not the game.
    async fn deliver_role_offers(&self) {
        let offers: Vec<(String, RoleOffer)> = self
            .roster
            .iter()
            .filter_map(|player| {
                let role = self.assignments.role_of(player)?;
                let endpoint = self.participants.get(player)?.clone();
                let offer = RoleOffer::new(
                    &self.task_id,
                    player,
                    role,
                    role_briefing(role),
                    game_rules(self.roster.len(), self.distribution, role),
                    self.assignments.teammates_of(player),
                );
                Some((endpoint, offer))
            })
            .collect();

        for (player, outcome) in self.client.send_role_offers(&offers).await {
            if let Err(err) = outcome {
                warn!(player = %player, error = %err, "role offer not delivered");
            }
        }
    }

    /// Predators strike, the doctor shields, the seer learns.
    ///
    /// Night actions run sequentially: the strike resolves against the
    /// doctor's choice, and the seer reads the table as it stood at dusk.
    async fn night_phase(&mut self) {
        self.state.phase = Phase::Night;
        let round = self.state.round;
        self.sink.publish(GameEvent::PhaseChange {
            phase: Phase::Night,
            round,
            timestamp: Utc::now(),
        });
        self.note("Night falls. Special roles take action.");

        // The senior predator (first alive in roster order) picks the target
        let mut target = None;
        if let Some(hunter) = self.alive_predators().first().cloned() {
            let options: Vec<String> = self
                .state
                .alive()
                .iter()
                .filter(|p| self.assignments.role_of(p.as_str()) != Some(Role::Predator))
                .cloned()
                .collect();
            if !options.is_empty() {
                let teammates: Vec<String> = self
                    .alive_predators()
                    .into_iter()
                    .filter(|p| p != &hunter)
                    .collect();
                let call = ActionCall::new(
                    &self.task_id,
                    &hunter,
                    ActionKind::Eliminate,
                    self.state.snapshot_for(&hunter),
                    Some(options.clone()),
                    Some(action_context(ActionKind::Eliminate, Some(&teammates))),
                );
                let reply = self.remote_decision(&hunter, call).await;
                target = match_option(&reply.decision, &options);
            }
        }

        if let Some(victim) = &target {
            for predator in self.alive_predators() {
                self.state
                    .observe(&predator, format!("Night {}: We targeted {}.", round, victim));
            }
        }

        let mut protected = None;
        if let Some(doctor) = self.alive_player_with_role(Role::Doctor) {
            let options = self.state.alive().to_vec();
            let call = ActionCall::new(
                &self.task_id,
                &doctor,
                ActionKind::Protect,
                self.state.snapshot_for(&doctor),
                Some(options.clone()),
                Some(action_context(ActionKind::Protect, None)),
            );
            let reply = self.remote_decision(&doctor, call).await;
            if let Some(choice) = match_option(&reply.decision, &options) {
                self.bump(&doctor, |m| m.protections_total += 1);
                protected = Some(choice);
            }
        }

        if let Some(seer) = self.alive_player_with_role(Role::Seer) {
            let options = self.state.alive_except(&seer);
            if !options.is_empty() {
                let call = ActionCall::new(
                    &self.task_id,
                    &seer,
                    ActionKind::Investigate,
                    self.state.snapshot_for(&seer),
                    Some(options.clone()),
                    Some(action_context(ActionKind::Investigate, None)),
                );
                let reply = self.remote_decision(&seer, call).await;
                if let Some(subject) = match_option(&reply.decision, &options) {
                    let is_predator =
                        self.assignments.role_of(&subject) == Some(Role::Predator);
                    self.bump(&seer, |m| {
                        m.investigations_total += 1;
                        if is_predator {
                            m.investigations_correct += 1;
                        }
                    });
                    let verdict = if is_predator {
                        "A PREDATOR"
                    } else {
                        "NOT A PREDATOR"
                    };
                    self.state.observe(
                        &seer,
                        format!(
                            "Night {}: Your investigation revealed {} is {}.",
                            round, subject, verdict
                        ),
                    );
                }
            }
        }

        let mut eliminated = None;
        if let Some(victim) = &target {
            if protected.as_deref() == Some(victim.as_str()) {
                // The save is silent: the group only learns nobody died
                if let Some(doctor) = self.alive_player_with_role(Role::Doctor) {
                    self.bump(&doctor, |m| m.protections_successful += 1);
                }
            } else {
                self.state.eliminate(victim);
                self.fall_rounds.insert(victim.clone(), round);
                eliminated = Some(victim.clone());
                for predator in self.alive_predators() {
                    self.bump(&predator, |m| m.eliminations_credited += 1);
                }
                let role = self.assignments.role_of(victim).unwrap_or(Role::Defender);
                self.state.announce(format!(
                    "During the night, {} was eliminated by the predators.",
                    victim
                ));
                self.sink.publish(GameEvent::PlayerEliminated {
                    player: victim.clone(),
                    role,
                    phase: Phase::Night,
                    round,
                    timestamp: Utc::now(),
                });
            }
        }
        if eliminated.is_none() {
            self.state
                .announce("The night passes. No one was eliminated.");
        }

        self.game_log.push(GameLogEntry::NightOutcome {
            round,
            target,
            protected,
            eliminated,
        });
    }

    /// A handful of players speak in a random order, each seeing what was
    /// said before them.
    async fn debate_phase(&mut self) {
        self.state.phase = Phase::Day;
        self.sink.publish(GameEvent::PhaseChange {
            phase: Phase::Day,
            round: self.state.round,
            timestamp: Utc::now(),
        });
        self.note("Day breaks. Time for discussion.");

        let mut speakers = self.state.alive().to_vec();
        speakers.shuffle(&mut self.rng);
        speakers.truncate(DEBATE_SPEAKERS);

        for speaker in speakers {
            let call = ActionCall::new(
                &self.task_id,
                &speaker,
                ActionKind::Debate,
                self.state.snapshot_for(&speaker),
                None,
                Some(action_context(ActionKind::Debate, None)),
            );
            let reply = self.remote_decision(&speaker, call).await;
            let spoke = !reply.is_declined();
            let statement = if spoke {
                reply.decision.trim().to_string()
            } else {
                "(said nothing)".to_string()
            };
            if spoke {
                self.bump(&speaker, |m| m.debate_turns += 1);
            }
            self.state.record_speech(&speaker, &statement);
            self.sink.publish(GameEvent::PlayerSpeak {
                player: speaker.clone(),
                content: statement.clone(),
                round: self.state.round,
                timestamp: Utc::now(),
            });
            self.note_with(
                format!("{} speaks", speaker),
                serde_json::json!({ "statement": preview(&statement) }),
            );
        }
    }

    /// Everyone alive votes at once; a strict majority exiles.
    async fn voting_phase(&mut self) {
        self.state.phase = Phase::Voting;
        let round = self.state.round;
        self.note("Voting begins");

        let voters = self.state.alive().to_vec();
        let calls: Vec<(String, ActionCall)> = voters
            .iter()
            .filter_map(|voter| {
                let endpoint = self.participants.get(voter)?.clone();
                let call = ActionCall::new(
                    &self.task_id,
                    voter,
                    ActionKind::Vote,
                    self.state.snapshot_for(voter),
                    Some(self.state.alive_except(voter)),
                    Some(action_context(ActionKind::Vote, None)),
                );
                Some((endpoint, call))
            })
            .collect();

        let replies = self.client.request_actions_parallel(&calls).await;

        // Tally in roster order so the audit trail reads the same way twice
        let mut votes: HashMap<String, String> = HashMap::new();
        let mut tally: HashMap<String, u32> = HashMap::new();
        for voter in &voters {
            let reply = match replies.get(voter) {
                Some(reply) => reply,
                None => continue,
            };
            self.game_log.push(GameLogEntry::Action {
                round,
                phase: Phase::Voting,
                player: voter.clone(),
                action: ActionKind::Vote,
                decision: reply.decision.clone(),
                reasoning: reply.reasoning.clone(),
            });

            let options = self.state.alive_except(voter);
            let target = match match_option(&reply.decision, &options) {
                Some(target) => target,
                None => continue,
            };
            votes.insert(voter.clone(), target.clone());
            *tally.entry(target.clone()).or_insert(0) += 1;
            self.bump(voter, |m| m.votes_cast += 1);

            if let (Some(voter_team), Some(target_team)) = (
                self.assignments.team_of(voter),
                self.assignments.team_of(&target),
            ) {
                if voter_team == target_team {
                    self.bump(voter, |m| m.wrong_votes += 1);
                } else if voter_team == Team::Defenders && target_team == Team::Predators {
                    self.bump(voter, |m| m.correct_votes += 1);
                }
                if detect_sabotage(ActionKind::Vote, voter_team, Some(target_team)) {
                    self.bump(voter, |m| m.sabotage_actions += 1);
                }
            }

            let target_is_predator = self.assignments.role_of(&target) == Some(Role::Predator);
            self.bump(&target, |m| {
                m.times_voted_against += 1;
                if target_is_predator {
                    m.times_suspected_correctly += 1;
                } else {
                    m.times_suspected_wrongly += 1;
                }
            });
        }

        let threshold = (self.state.alive_count() / 2 + 1) as u32;
        let top = tally.values().copied().max().unwrap_or(0);
        let mut exiled = None;
        if top >= threshold {
            // Candidates in roster order so a tie draw is reproducible
            let candidates: Vec<String> = voters
                .iter()
                .filter(|p| tally.get(p.as_str()).copied().unwrap_or(0) == top)
                .cloned()
                .collect();
            exiled = if candidates.len() == 1 {
                candidates.first().cloned()
            } else {
                candidates.choose(&mut self.rng).cloned()
            };
        }

        match exiled {
            Some(exile) => {
                let role = self.assignments.role_of(&exile).unwrap_or(Role::Defender);
                let exile_is_predator = role == Role::Predator;
                self.state.eliminate(&exile);
                self.fall_rounds.insert(exile.clone(), round);
                self.state.announce(format!(
                    "The group votes to exile {}. They were a {}.",
                    exile, role
                ));
                self.sink.publish(GameEvent::PlayerEliminated {
                    player: exile.clone(),
                    role,
                    phase: Phase::Voting,
                    round,
                    timestamp: Utc::now(),
                });

                // Everyone who voted for the exile owns the outcome
                let accusers: Vec<String> = votes
                    .iter()
                    .filter(|(_, target)| target.as_str() == exile.as_str())
                    .map(|(voter, _)| voter.clone())
                    .collect();
                for accuser in accusers {
                    self.bump(&accuser, |m| {
                        if exile_is_predator {
                            m.successful_accusations += 1;
                        } else {
                            m.failed_accusations += 1;
                        }
                    });
                }

                self.game_log.push(GameLogEntry::Exile {
                    round,
                    votes,
                    exiled: exile,
                    role,
                });
            }
            None => {
                self.state
                    .announce("No majority reached. No one is exiled.");
                self.game_log.push(GameLogEntry::NoExile { round, votes });
            }
        }
    }

    /// Defenders win when no predator is left; predators win at parity
    fn check_winner(&self) -> Option<Winner> {
        let predators = self.alive_predators().len();
        let others = self.state.alive_count() - predators;
        if predators == 0 {
            Some(Winner::Defenders)
        } else if predators >= others {
            Some(Winner::Predators)
        } else {
            None
        }
    }

    fn finalize(mut self, winner: Winner, started: Instant) -> GameReport {
        self.state.phase = Phase::Ended;
        let rounds = self.state.round;

        for player in &self.roster {
            let survived = self.state.is_alive(player);
            let lasted = self.fall_rounds.get(player).copied().unwrap_or(rounds);
            if let Some(metrics) = self.metrics.get_mut(player) {
                metrics.finalize(winner, survived, lasted);
            }
        }

        self.note(format!(
            "Game over! {} win!",
            winner.to_string().to_uppercase()
        ));

        let ordered: Vec<PlayerMetrics> = self
            .roster
            .iter()
            .filter_map(|player| self.metrics.get(player).cloned())
            .collect();
        let scores = self
            .scoreboard
            .record_game(&self.task_id, winner, rounds, &ordered);
        let results = self.scoreboard.results_for(&self.roster);

        let total_predators = self.assignments.predators().len();
        let alive_predators = self.alive_predators().len();
        let predator_survival_rate = if total_predators > 0 {
            alive_predators as f64 / total_predators as f64
        } else {
            0.0
        };
        let aggregate_metrics = HashMap::from([
            ("total_rounds".to_string(), rounds as f64),
            (
                "game_duration_seconds".to_string(),
                started.elapsed().as_secs_f64(),
            ),
            (
                "predator_survival_rate".to_string(),
                predator_survival_rate,
            ),
        ]);

        self.sink.publish(GameEvent::GameOver {
            winner,
            rounds,
            timestamp: Utc::now(),
        });
        info!(task_id = %self.task_id, winner = %winner, rounds, "game complete");

        GameReport {
            task_id: self.task_id,
            winner,
            rounds_played: rounds,
            participants: self.participants,
            scores,
            results,
            aggregate_metrics,
            game_log: self.game_log,
            debate_transcript: self.state.transcript().to_vec(),
            diagnostic: None,
        }
    }

    /// One remote decision, logged whatever happens. Failures degrade to a
    /// declined reply.
    async fn remote_decision(&mut self, player: &str, call: ActionCall) -> ActionReply {
        let reply = match self.participants.get(player) {
            Some(endpoint) => {
                let span = telemetry::call_span(player, call.action, endpoint);
                let started = Instant::now();
                let outcome = self
                    .client
                    .request_action(endpoint, &call)
                    .instrument(span.clone())
                    .await;
                telemetry::record_call_result(
                    &span,
                    outcome.is_ok(),
                    started.elapsed().as_millis() as u64,
                );
                match outcome {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(player = %player, error = %err, "action degraded to decline");
                        ActionReply::declined(&call, err)
                    }
                }
            }
            None => ActionReply::declined(&call, "no endpoint registered"),
        };
        self.game_log.push(GameLogEntry::Action {
            round: self.state.round,
            phase: self.state.phase,
            player: player.to_string(),
            action: call.action,
            decision: reply.decision.clone(),
            reasoning: reply.reasoning.clone(),
        });
        reply
    }

    /// Alive predators in roster order
    fn alive_predators(&self) -> Vec<String> {
        self.assignments
            .predators()
            .into_iter()
            .filter(|p| self.state.is_alive(p))
            .collect()
    }

    fn alive_player_with_role(&self, role: Role) -> Option<String> {
        self.state
            .alive()
            .iter()
            .find(|p| self.assignments.role_of(p.as_str()) == Some(role))
            .cloned()
    }

    fn bump(&mut self, player: &str, update: impl FnOnce(&mut PlayerMetrics)) {
        if let Some(metrics) = self.metrics.get_mut(player) {
            update(metrics);
        }
    }

    fn note(&self, message: impl Into<String>) {
        self.sink.note(ProgressNote::new(
            &self.task_id,
            self.state.round,
            self.state.phase,
            message,
        ));
    }

    fn note_with(&self, message: impl Into<String>, details: serde_json::Value) {
        self.sink.note(
            ProgressNote::new(&self.task_id, self.state.round, self.state.phase, message)
                .with_details(details),
        );
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AgentTransport, ClientError, ClientResult, RetryPolicy};
    use crate::events::MemorySink;
    use crate::scoring::Scoreboard;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers every probe, declines every action
    struct MuteTransport {
        deaf: Vec<String>,
    }

    impl MuteTransport {
        fn new() -> Self {
            Self { deaf: Vec::new() }
        }

        fn deaf_to(endpoints: &[&str]) -> Self {
            Self {
                deaf: endpoints.iter().map(|e| e.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl AgentTransport for MuteTransport {
        async fn call(
            &self,
            _endpoint: &str,
            _method: &str,
            _params: Value,
            _request_id: &str,
        ) -> ClientResult<Value> {
            Ok(json!({ "decision": "" }))
        }

        async fn probe(&self, endpoint: &str) -> ClientResult<()> {
            if self.deaf.iter().any(|e| e == endpoint) {
                Err(ClientError::transport(endpoint, "connection refused"))
            } else {
                Ok(())
            }
        }
    }

    fn participants(n: usize) -> HashMap<String, String> {
        (0..n)
            .map(|i| (format!("player{}", i), format!("http://localhost:91{:02}", i)))
            .collect()
    }

    fn quick_client(transport: Arc<dyn AgentTransport>) -> AgentClient {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
        };
        AgentClient::new(transport, policy, Duration::from_secs(1))
    }

    fn quick_config() -> GameConfig {
        GameConfig {
            max_rounds: 2,
            call_timeout: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_unsupported_player_count() {
        let result = GameSession::new(
            "task-1",
            participants(4),
            quick_config(),
            quick_client(Arc::new(MuteTransport::new())),
            Arc::new(MemorySink::new()),
            Scoreboard::shared(),
        );
        assert!(matches!(result, Err(ArbiterError::Configuration { .. })));
    }

    #[test]
    fn test_generated_task_ids_are_distinct() {
        let build = || {
            GameSession::with_generated_id(
                participants(5),
                quick_config(),
                quick_client(Arc::new(MuteTransport::new())),
                Arc::new(MemorySink::new()),
                Scoreboard::shared(),
            )
            .unwrap()
        };
        let a = build();
        let b = build();
        assert!(a.task_id().starts_with("game-"));
        assert_ne!(a.task_id(), b.task_id());
    }

    #[test]
    fn test_same_seed_deals_same_roles() {
        let build = || {
            GameSession::new(
                "task-1",
                participants(6),
                quick_config(),
                quick_client(Arc::new(MuteTransport::new())),
                Arc::new(MemorySink::new()),
                Scoreboard::shared(),
            )
            .unwrap()
        };
        let a = build();
        let b = build();
        for player in a.assignments().roster() {
            assert_eq!(
                a.assignments().role_of(player),
                b.assignments().role_of(player)
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_agent_aborts_with_error_report() {
        let roster = participants(5);
        let bad_endpoint = roster["player2"].clone();
        let session = GameSession::new(
            "task-err",
            roster,
            quick_config(),
            quick_client(Arc::new(MuteTransport::deaf_to(&[&bad_endpoint]))),
            Arc::new(MemorySink::new()),
            Scoreboard::shared(),
        )
        .unwrap();

        let report = session.run().await;
        assert_eq!(report.winner, Winner::Error);
        assert_eq!(report.rounds_played, 0);
        assert!(report.scores.is_empty());
        assert!(report.diagnostic.unwrap().contains("player2"));
    }

    #[tokio::test]
    async fn test_silent_game_runs_to_round_limit() {
        let sink = Arc::new(MemorySink::new());
        let scoreboard = Scoreboard::shared();
        let session = GameSession::new(
            "task-mute",
            participants(5),
            quick_config(),
            quick_client(Arc::new(MuteTransport::new())),
            sink.clone(),
            scoreboard.clone(),
        )
        .unwrap();

        let report = session.run().await;

        // Nobody acts, nobody dies, predators survive to take the game
        assert_eq!(report.winner, Winner::Predators);
        assert_eq!(report.rounds_played, 2);
        assert_eq!(report.scores.len(), 5);
        assert!(report.diagnostic.is_none());

        // Five speakers per day across two rounds, all silent
        assert_eq!(report.debate_transcript.len(), 10);
        assert!(report
            .debate_transcript
            .iter()
            .all(|entry| entry.message == "(said nothing)"));

        let types = sink.event_types();
        assert_eq!(types.first().copied(), Some("game_start"));
        assert_eq!(types.last().copied(), Some("game_over"));
        assert!(!types.iter().any(|t| *t == "player_eliminated"));

        assert_eq!(scoreboard.games_recorded(), 1);
    }

    #[tokio::test]
    async fn test_deadline_produces_error_report() {
        /// Stalls forever on every action call
        struct StallTransport;

        #[async_trait]
        impl AgentTransport for StallTransport {
            async fn call(
                &self,
                _endpoint: &str,
                _method: &str,
                _params: Value,
                _request_id: &str,
            ) -> ClientResult<Value> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(json!({}))
            }

            async fn probe(&self, _endpoint: &str) -> ClientResult<()> {
                Ok(())
            }
        }

        let config = GameConfig {
            game_deadline: Some(Duration::from_millis(50)),
            ..quick_config()
        };
        let session = GameSession::new(
            "task-slow",
            participants(5),
            config,
            quick_client(Arc::new(StallTransport)),
            Arc::new(MemorySink::new()),
            Scoreboard::shared(),
        )
        .unwrap();

        let report = session.run().await;
        assert_eq!(report.winner, Winner::Error);
        assert_eq!(
            report.diagnostic.as_deref(),
            Some("game deadline exceeded")
        );
    }
}
