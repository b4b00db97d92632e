//! Game configuration, live state, and the structured game log

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};
use crate::protocol::{ActionKind, DebateEntry, Phase, StateSnapshot};
use crate::roles::Role;

/// Knobs for one orchestrated game
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Day/night cycles before the game is called on points
    pub max_rounds: u32,
    /// Time budget for a single agent request, retries included
    pub call_timeout: Duration,
    /// Time budget for the pre-game reachability probe
    pub probe_timeout: Duration,
    /// Wall-clock ceiling for the whole game, unlimited when unset
    pub game_deadline: Option<Duration>,
    /// Fixed RNG seed; identical seeds and agent replies replay identically
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            call_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
            game_deadline: None,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.max_rounds == 0 {
            return Err(ArbiterError::config("max_rounds must be at least 1"));
        }
        Ok(())
    }
}

/// One entry in the structured, replayable game log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameLogEntry {
    RolesAssigned {
        roles: HashMap<String, Role>,
    },
    /// Every remote decision, successful or declined
    Action {
        round: u32,
        phase: Phase,
        player: String,
        action: ActionKind,
        decision: String,
        reasoning: Option<String>,
    },
    NightOutcome {
        round: u32,
        target: Option<String>,
        protected: Option<String>,
        eliminated: Option<String>,
    },
    Exile {
        round: u32,
        votes: HashMap<String, String>,
        exiled: String,
        role: Role,
    },
    NoExile {
        round: u32,
        votes: HashMap<String, String>,
    },
}

/// Live state of a running game.
///
/// `alive` keeps roster order and `eliminated` keeps elimination order;
/// together they always partition the original roster.
#[derive(Debug, Clone)]
pub struct GameState {
    pub round: u32,
    pub phase: Phase,
    alive: Vec<String>,
    eliminated: Vec<String>,
    /// Current round's debate only, cleared when a round starts
    debate: Vec<DebateEntry>,
    /// Every debate statement across the whole game
    transcript: Vec<DebateEntry>,
    announcements: Vec<String>,
    observations: HashMap<String, Vec<String>>,
}

impl GameState {
    pub fn new(roster: Vec<String>) -> Self {
        Self {
            round: 0,
            phase: Phase::Night,
            alive: roster,
            eliminated: Vec::new(),
            debate: Vec::new(),
            transcript: Vec::new(),
            announcements: Vec::new(),
            observations: HashMap::new(),
        }
    }

    pub fn alive(&self) -> &[String] {
        &self.alive
    }

    pub fn eliminated(&self) -> &[String] {
        &self.eliminated
    }

    pub fn is_alive(&self, player: &str) -> bool {
        self.alive.iter().any(|p| p == player)
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Move a player from alive to eliminated, keeping both orders.
    /// Returns false if the player was not alive.
    pub fn eliminate(&mut self, player: &str) -> bool {
        match self.alive.iter().position(|p| p == player) {
            Some(index) => {
                let removed = self.alive.remove(index);
                self.eliminated.push(removed);
                true
            }
            None => false,
        }
    }

    /// Alive players other than the given one, in roster order
    pub fn alive_except(&self, player: &str) -> Vec<String> {
        self.alive.iter().filter(|p| *p != player).cloned().collect()
    }

    pub fn announce(&mut self, text: impl Into<String>) {
        self.announcements.push(text.into());
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    /// Record a private observation only the given player will see
    pub fn observe(&mut self, player: &str, note: impl Into<String>) {
        self.observations
            .entry(player.to_string())
            .or_default()
            .push(note.into());
    }

    pub fn observations_of(&self, player: &str) -> &[String] {
        self.observations
            .get(player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record a debate statement in the round buffer and the transcript
    pub fn record_speech(&mut self, speaker: &str, message: &str) {
        let entry = DebateEntry::new(speaker, message);
        self.debate.push(entry.clone());
        self.transcript.push(entry);
    }

    pub fn debate(&self) -> &[DebateEntry] {
        &self.debate
    }

    pub fn transcript(&self) -> &[DebateEntry] {
        &self.transcript
    }

    /// Drop the round's debate buffer; the transcript keeps everything
    pub fn clear_debate(&mut self) {
        self.debate.clear();
    }

    /// The view of the game sent to one player. Observations are the
    /// viewer's own; everything else is public.
    pub fn snapshot_for(&self, viewer: &str) -> StateSnapshot {
        StateSnapshot {
            round: self.round,
            phase: self.phase,
            alive_players: self.alive.clone(),
            eliminated_players: self.eliminated.clone(),
            debate_so_far: self.debate.clone(),
            announcements: self.announcements.clone(),
            your_observations: self.observations_of(viewer).to_vec(),
        }
    }
}
