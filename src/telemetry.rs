//! Structured `tracing` span helpers
//!
//! Span builders for the orchestration pipeline, with dot-notation field
//! names suitable for OpenTelemetry-style export.
//!
//! # Span Hierarchy
//!
//! ```text
//! arbiter.game             (root — one per orchestrated game)
//!   └─ arbiter.phase       (night, day, voting within one round)
//!       └─ arbiter.call    (one remote agent request)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use arbiter::telemetry;
//!
//! let span = telemetry::call_span("alice", ActionKind::Vote, endpoint);
//! let reply = client.request_action(endpoint, &call).instrument(span.clone()).await;
//! telemetry::record_call_result(&span, reply.is_ok(), elapsed_ms);
//! ```

use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::protocol::{ActionKind, Phase};
use crate::roles::Winner;

// ── Span Name Constants ──────────────────────────────────────────────

/// Root span for one orchestrated game.
pub const SPAN_GAME: &str = "arbiter.game";

/// One phase (night, day, voting) within a round.
pub const SPAN_PHASE: &str = "arbiter.phase";

/// One remote agent request.
pub const SPAN_CALL: &str = "arbiter.call";

// ── Field Name Constants ─────────────────────────────────────────────

pub const FIELD_TASK_ID: &str = "task.id";
pub const FIELD_PLAYERS: &str = "arbiter.players";
pub const FIELD_ROUND: &str = "arbiter.round";
pub const FIELD_PHASE: &str = "arbiter.phase.name";
pub const FIELD_PLAYER: &str = "arbiter.player";
pub const FIELD_ACTION: &str = "arbiter.action";
pub const FIELD_ENDPOINT: &str = "arbiter.endpoint";
pub const FIELD_WINNER: &str = "arbiter.winner";
pub const FIELD_ROUNDS: &str = "arbiter.rounds";
pub const FIELD_SUCCESS: &str = "arbiter.success";
pub const FIELD_DURATION_MS: &str = "arbiter.duration_ms";

// ── Subscriber Setup ─────────────────────────────────────────────────

/// Install the default fmt subscriber on stderr.
///
/// Honors `RUST_LOG`, defaulting to `arbiter=info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arbiter=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ── Span Builders ────────────────────────────────────────────────────

/// Create the root span for one game.
///
/// Fields filled at creation: `task.id`, `arbiter.players`.
/// Fields filled later via [`record_game_result`]: winner, rounds, duration.
pub fn game_span(task_id: &str, players: usize) -> Span {
    tracing::info_span!(
        "arbiter.game",
        "task.id" = %task_id,
        "arbiter.players" = players as u64,
        "arbiter.winner" = tracing::field::Empty,
        "arbiter.rounds" = tracing::field::Empty,
        "arbiter.duration_ms" = tracing::field::Empty,
    )
}

/// Record the final result on a game span.
pub fn record_game_result(span: &Span, winner: Winner, rounds: u32, duration_ms: u64) {
    span.record("arbiter.winner", tracing::field::display(winner));
    span.record("arbiter.rounds", rounds);
    span.record("arbiter.duration_ms", duration_ms);
}

/// Create a span for one phase of one round.
pub fn phase_span(task_id: &str, round: u32, phase: Phase) -> Span {
    tracing::info_span!(
        "arbiter.phase",
        "task.id" = %task_id,
        "arbiter.round" = round,
        "arbiter.phase.name" = %phase,
    )
}

/// Create a span for one remote agent request.
///
/// Fields filled at creation: player, action, endpoint.
/// Fields filled later via [`record_call_result`]: success, duration.
pub fn call_span(player: &str, action: ActionKind, endpoint: &str) -> Span {
    tracing::info_span!(
        "arbiter.call",
        "arbiter.player" = %player,
        "arbiter.action" = %action,
        "arbiter.endpoint" = %endpoint,
        "arbiter.success" = tracing::field::Empty,
        "arbiter.duration_ms" = tracing::field::Empty,
    )
}

/// Record the outcome of a remote agent request.
pub fn record_call_result(span: &Span, success: bool, duration_ms: u64) {
    span.record("arbiter.success", success);
    span.record("arbiter.duration_ms", duration_ms);
}
