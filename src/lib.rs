//! Arbiter — social-deduction games between remote agents
//!
//! This library provides:
//! - A complete hidden-role game loop (night actions, open debate,
//!   majority voting) orchestrated over JSON-RPC against remote agents
//! - Multi-dimensional behavioral scoring with weighted aggregation and
//!   three independent ELO ladders
//! - Structured events and progress notes for live observation
//!
//! # Features
//!
//! ## Game Engine
//! - `GameSession`: one full game, from connectivity probe to scored report
//! - `GameConfig`: round limits, call deadlines, and the replay seed
//! - `GameLogEntry`: the structured audit trail of every decision
//!
//! ## Remote Agents
//! - `AgentClient`: deadlines, retries, and parallel fan-out over any
//!   [`AgentTransport`]
//! - `HttpTransport`: the JSON-RPC-over-HTTP wire implementation
//!
//! ## Scoring
//! - `ScoringEngine`: per-dimension scores from observed play
//! - `Scoreboard`: cross-game accumulation, ELO ladders, leaderboards
//!
//! # Usage
//!
//! ```ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use arbiter::{AgentClient, GameConfig, GameSession, MemorySink, Scoreboard};
//!
//! let participants: HashMap<String, String> = agents_by_name();
//! let client = AgentClient::http(Duration::from_secs(60))?;
//! let scoreboard = Scoreboard::shared();
//!
//! let session = GameSession::new(
//!     "game-001",
//!     participants,
//!     GameConfig::default(),
//!     client,
//!     Arc::new(MemorySink::new()),
//!     scoreboard.clone(),
//! )?;
//! let report = session.run().await;
//! println!("{} won after {} rounds", report.winner, report.rounds_played);
//! ```

#![allow(dead_code)]
#![allow(clippy::uninlined_format_args)]

pub mod client;
pub mod engine;
pub mod error;
pub mod events;
pub mod protocol;
pub mod roles;
pub mod scoring;
pub mod telemetry;

// Re-export key engine types
pub use engine::{GameConfig, GameLogEntry, GameSession, GameState};

// Re-export key role types
pub use roles::{
    assign_roles, Role, RoleAssignments, RoleDistribution, Team, Winner, MAX_PLAYERS, MIN_PLAYERS,
};

// Re-export key protocol types
pub use protocol::{
    match_option, ActionCall, ActionKind, ActionReply, DebateEntry, Phase, RoleOffer,
    StateSnapshot,
};

// Re-export key client types
pub use client::{
    AgentClient, AgentTransport, ClientError, ClientResult, HttpTransport, RetryPolicy,
    SharedTransport,
};

// Re-export key event types
pub use events::{
    EventBus, EventBusExt, EventFilter, GameEvent, MemorySink, NullSink, ProgressNote,
    ProgressSink, SharedEventBus, SharedSink,
};

// Re-export key scoring types
pub use scoring::{
    EloLadder, GameRecord, GameReport, ParticipantResult, PlayerMetrics, PlayerScore, Scoreboard,
    ScoringEngine, SharedScoreboard,
};

// Re-export error types
pub use error::{ArbiterError, ArbiterResult};

// Re-export subscriber setup
pub use telemetry::init_tracing;
