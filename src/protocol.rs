//! Wire types exchanged with remote agents
//!
//! Role offers and action calls travel inside a JSON-RPC 2.0 envelope; the
//! structs here are the `params` payloads. Also holds [`match_option`], the
//! tolerant decision matcher for choice-constrained actions.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Message discriminator carried on every wire payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    RoleAssignment,
    ActionRequest,
    ActionResponse,
}

/// The action a player is being asked to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Debate,
    Vote,
    Eliminate,
    Investigate,
    Protect,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debate => write!(f, "debate"),
            Self::Vote => write!(f, "vote"),
            Self::Eliminate => write!(f, "eliminate"),
            Self::Investigate => write!(f, "investigate"),
            Self::Protect => write!(f, "protect"),
        }
    }
}

/// Where the game currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Night,
    Day,
    Voting,
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Night => write!(f, "night"),
            Self::Day => write!(f, "day"),
            Self::Voting => write!(f, "voting"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// One statement in the current day's debate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateEntry {
    pub speaker: String,
    pub message: String,
}

impl DebateEntry {
    pub fn new(speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            message: message.into(),
        }
    }
}

/// Game state as one player is allowed to see it.
///
/// `your_observations` holds only that player's private findings (seer
/// verdicts, protection confirmations, predator coordination notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub round: u32,
    pub phase: Phase,
    pub alive_players: Vec<String>,
    #[serde(default)]
    pub eliminated_players: Vec<String>,
    #[serde(default)]
    pub debate_so_far: Vec<DebateEntry>,
    #[serde(default)]
    pub announcements: Vec<String>,
    #[serde(default)]
    pub your_observations: Vec<String>,
}

/// Role-assignment payload sent to one player at game start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleOffer {
    #[serde(rename = "type")]
    pub message_type: MessageKind,
    pub task_id: String,
    pub player_name: String,
    pub role: Role,
    pub role_description: String,
    pub game_rules: String,
    /// Fellow predators; `Some` only for predators, empty for a lone one
    pub teammates: Option<Vec<String>>,
}

impl RoleOffer {
    pub fn new(
        task_id: impl Into<String>,
        player_name: impl Into<String>,
        role: Role,
        role_description: impl Into<String>,
        game_rules: impl Into<String>,
        teammates: Option<Vec<String>>,
    ) -> Self {
        Self {
            message_type: MessageKind::RoleAssignment,
            task_id: task_id.into(),
            player_name: player_name.into(),
            role,
            role_description: role_description.into(),
            game_rules: game_rules.into(),
            teammates,
        }
    }

    /// Envelope id for the role-assignment request
    pub fn rpc_id(&self) -> String {
        format!("{}_role_{}", self.task_id, self.player_name)
    }
}

/// A request for one player to act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    #[serde(rename = "type")]
    pub message_type: MessageKind,
    pub task_id: String,
    pub player_name: String,
    pub action: ActionKind,
    pub game_state: StateSnapshot,
    /// Valid choices where the action is choice-constrained
    pub options: Option<Vec<String>>,
    pub context: Option<String>,
}

impl ActionCall {
    pub fn new(
        task_id: impl Into<String>,
        player_name: impl Into<String>,
        action: ActionKind,
        game_state: StateSnapshot,
        options: Option<Vec<String>>,
        context: Option<String>,
    ) -> Self {
        Self {
            message_type: MessageKind::ActionRequest,
            task_id: task_id.into(),
            player_name: player_name.into(),
            action,
            game_state,
            options,
            context,
        }
    }

    /// Envelope id for the action request
    pub fn rpc_id(&self) -> String {
        format!("{}_{}_{}", self.task_id, self.action, self.player_name)
    }
}

/// A player's answer to an [`ActionCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReply {
    #[serde(rename = "type")]
    pub message_type: MessageKind,
    pub task_id: String,
    pub player_name: String,
    pub action: ActionKind,
    pub decision: String,
    pub reasoning: Option<String>,
}

impl ActionReply {
    /// Wrap a decision received from the remote agent
    pub fn answer(call: &ActionCall, decision: impl Into<String>, reasoning: Option<String>) -> Self {
        Self {
            message_type: MessageKind::ActionResponse,
            task_id: call.task_id.clone(),
            player_name: call.player_name.clone(),
            action: call.action,
            decision: decision.into(),
            reasoning,
        }
    }

    /// The degraded reply recorded when a player could not (or would not)
    /// answer. Empty decision, failure captured in the reasoning.
    pub fn declined(call: &ActionCall, reason: impl std::fmt::Display) -> Self {
        Self {
            message_type: MessageKind::ActionResponse,
            task_id: call.task_id.clone(),
            player_name: call.player_name.clone(),
            action: call.action,
            decision: String::new(),
            reasoning: Some(format!("Error: {}", reason)),
        }
    }

    pub fn is_declined(&self) -> bool {
        self.decision.trim().is_empty()
    }
}

/// Match a free-text decision against the offered options.
///
/// Trimmed exact equality wins outright. Otherwise every option contained in
/// the decision text is a candidate and only a unique longest candidate is
/// accepted, so "I vote for Player10" resolves to Player10 even though
/// Player1 is also contained. A tie between equal-length candidates, or no
/// candidate at all, resolves to `None`: the action is declined, never
/// guessed.
pub fn match_option(decision: &str, options: &[String]) -> Option<String> {
    let decision = decision.trim();
    if decision.is_empty() {
        return None;
    }
    if let Some(exact) = options.iter().find(|o| o.as_str() == decision) {
        return Some(exact.clone());
    }

    let mut best: Option<&String> = None;
    let mut ambiguous = false;
    for option in options {
        if !decision.contains(option.as_str()) {
            continue;
        }
        match best {
            None => best = Some(option),
            Some(current) if option.len() > current.len() => {
                best = Some(option);
                ambiguous = false;
            }
            Some(current) if option.len() == current.len() => ambiguous = true,
            Some(_) => {}
        }
    }
    if ambiguous {
        None
    } else {
        best.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn call() -> ActionCall {
        ActionCall::new(
            "task1",
            "player3",
            ActionKind::Vote,
            StateSnapshot {
                round: 2,
                phase: Phase::Voting,
                alive_players: vec!["player1".into(), "player3".into()],
                eliminated_players: vec!["player2".into()],
                debate_so_far: vec![DebateEntry::new("player1", "I trust nobody")],
                announcements: vec!["During the night, player2 was eliminated by the predators.".into()],
                your_observations: vec![],
            },
            Some(options(&["player1"])),
            Some("VOTING PHASE".into()),
        )
    }

    #[test]
    fn test_match_exact() {
        let opts = options(&["Player1", "Player10"]);
        assert_eq!(match_option("Player1", &opts), Some("Player1".to_string()));
        assert_eq!(match_option("  Player10  ", &opts), Some("Player10".to_string()));
    }

    #[test]
    fn test_match_longest_contained() {
        let opts = options(&["Player1", "Player10"]);
        assert_eq!(
            match_option("I vote for Player10, they dodge every question", &opts),
            Some("Player10".to_string())
        );
    }

    #[test]
    fn test_match_ambiguous_declines() {
        let opts = options(&["Player1", "Player2"]);
        assert_eq!(match_option("Player1 or maybe Player2", &opts), None);
    }

    #[test]
    fn test_match_none() {
        let opts = options(&["Player1", "Player2"]);
        assert_eq!(match_option("abstain", &opts), None);
        assert_eq!(match_option("", &opts), None);
        assert_eq!(match_option("   ", &opts), None);
    }

    #[test]
    fn test_declined_reply() {
        let call = call();
        let reply = ActionReply::declined(&call, "request timed out");
        assert!(reply.is_declined());
        assert_eq!(reply.decision, "");
        assert_eq!(reply.player_name, "player3");
        assert_eq!(reply.action, ActionKind::Vote);
        assert!(reply.reasoning.as_deref().unwrap().starts_with("Error:"));

        let answered = ActionReply::answer(&call, "player1", Some("gut feeling".into()));
        assert!(!answered.is_declined());
    }

    #[test]
    fn test_rpc_ids() {
        let offer = RoleOffer::new("t9", "alice", Role::Seer, "brief", "rules", None);
        assert_eq!(offer.rpc_id(), "t9_role_alice");
        assert_eq!(call().rpc_id(), "task1_vote_player3");
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(call()).unwrap();
        assert_eq!(value["type"], "action_request");
        assert_eq!(value["action"], "vote");
        assert_eq!(value["game_state"]["phase"], "voting");
        assert_eq!(value["game_state"]["debate_so_far"][0]["speaker"], "player1");

        let offer = RoleOffer::new("t9", "bob", Role::Predator, "brief", "rules", Some(vec![]));
        let value = serde_json::to_value(offer).unwrap();
        assert_eq!(value["type"], "role_assignment");
        assert_eq!(value["role"], "predator");
        assert_eq!(value["teammates"], serde_json::json!([]));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Night.to_string(), "night");
        assert_eq!(Phase::Voting.to_string(), "voting");
        assert_eq!(ActionKind::Eliminate.to_string(), "eliminate");
    }
}
