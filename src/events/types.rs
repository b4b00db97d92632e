//! Event types emitted while a game runs
//!
//! Events are the replayable record of a game; progress notes are the
//! human-readable side channel. Both are observational only and never feed
//! back into game decisions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::Phase;
use crate::roles::{Role, Winner};

/// Everything a subscriber can watch happen during a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Roles are dealt and the game is about to begin
    GameStart {
        game_id: String,
        players: Vec<String>,
        roles: HashMap<String, Role>,
        timestamp: DateTime<Utc>,
    },

    /// The game moved into a new phase
    PhaseChange {
        phase: Phase,
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// A player spoke during the day's debate
    PlayerSpeak {
        player: String,
        content: String,
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// A player left the game, at night or by exile
    PlayerEliminated {
        player: String,
        role: Role,
        phase: Phase,
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// The game is over
    GameOver {
        winner: Winner,
        rounds: u32,
        timestamp: DateTime<Utc>,
    },
}

impl GameEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            GameEvent::GameStart { timestamp, .. } => *timestamp,
            GameEvent::PhaseChange { timestamp, .. } => *timestamp,
            GameEvent::PlayerSpeak { timestamp, .. } => *timestamp,
            GameEvent::PlayerEliminated { timestamp, .. } => *timestamp,
            GameEvent::GameOver { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameStart { .. } => "game_start",
            GameEvent::PhaseChange { .. } => "phase_change",
            GameEvent::PlayerSpeak { .. } => "player_speak",
            GameEvent::PlayerEliminated { .. } => "player_eliminated",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    /// The round this event belongs to, if it is round-scoped
    pub fn round(&self) -> Option<u32> {
        match self {
            GameEvent::PhaseChange { round, .. } => Some(*round),
            GameEvent::PlayerSpeak { round, .. } => Some(*round),
            GameEvent::PlayerEliminated { round, .. } => Some(*round),
            _ => None,
        }
    }

    /// The player this event is about, if it is player-scoped
    pub fn player(&self) -> Option<&str> {
        match self {
            GameEvent::PlayerSpeak { player, .. } => Some(player),
            GameEvent::PlayerEliminated { player, .. } => Some(player),
            _ => None,
        }
    }
}

/// A progress update for whoever is watching the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressNote {
    pub task_id: String,
    pub round: u32,
    pub phase: Phase,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ProgressNote {
    pub fn new(
        task_id: impl Into<String>,
        round: u32,
        phase: Phase,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            round,
            phase,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details to the note
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::PlayerEliminated {
            player: "player4".to_string(),
            role: Role::Seer,
            phase: Phase::Night,
            round: 2,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: GameEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.event_type(), "player_eliminated");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "player_eliminated");
        assert_eq!(value["role"], "seer");
        assert_eq!(value["phase"], "night");
    }

    #[test]
    fn test_event_accessors() {
        let event = GameEvent::PlayerSpeak {
            player: "player1".to_string(),
            content: "I saw nothing last night".to_string(),
            round: 3,
            timestamp: Utc::now(),
        };

        assert_eq!(event.round(), Some(3));
        assert_eq!(event.player(), Some("player1"));
        assert_eq!(event.event_type(), "player_speak");

        let over = GameEvent::GameOver {
            winner: Winner::Defenders,
            rounds: 4,
            timestamp: Utc::now(),
        };
        assert_eq!(over.round(), None);
        assert_eq!(over.player(), None);
    }

    #[test]
    fn test_progress_note() {
        let note = ProgressNote::new("task-1", 2, Phase::Day, "player3 speaks")
            .with_details(serde_json::json!({"speaker": "player3"}));

        assert_eq!(note.round, 2);
        assert_eq!(note.details.as_ref().unwrap()["speaker"], "player3");
    }
}
