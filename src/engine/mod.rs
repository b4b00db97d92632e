//! Game orchestration engine
//!
//! Drives complete games between remote agents:
//!
//! - [`GameConfig`]: round limit, timeouts, optional deadline and seed
//! - [`GameState`]: who is alive, what was said, what everyone knows
//! - [`GameSession`]: the full night/day/voting loop, probe to report
//! - [`GameLogEntry`]: the structured audit trail inside each report
//!
//! A session is created per game and consumed by [`GameSession::run`];
//! cross-game state lives in the scoreboard, not here.

pub mod session;
pub mod state;

pub use session::GameSession;
pub use state::{GameConfig, GameLogEntry, GameState};
