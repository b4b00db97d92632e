//! Game observation: progress notes, structured events, pub/sub fan-out
//!
//! Everything a running game tells the outside world flows through this
//! module. The engine writes to a [`ProgressSink`]; what happens after that
//! is the subscriber's business and can never fail or stall the game.
//!
//! # Components
//!
//! 1. **Event Types** (`types.rs`): the five structured events that make a
//!    game replayable, plus the human-readable progress note.
//!
//! 2. **Sinks** (`sink.rs`): the [`ProgressSink`] seam the engine reports
//!    through, with null and in-memory implementations.
//!
//! 3. **Event Bus** (`bus.rs`): Tokio broadcast-based pub/sub with
//!    filtered subscriptions.
//!
//! # Usage
//!
//! ```ignore
//! use arbiter::events::{EventBus, EventBusExt, EventFilter};
//!
//! let bus = EventBus::new().shared();
//!
//! // Watch every event
//! let mut all = bus.subscribe();
//!
//! // Watch only eliminations
//! let mut eliminations =
//!     bus.subscribe_filtered(EventFilter::new().types(vec!["player_eliminated"]));
//!
//! // The bus doubles as the sink handed to a game session
//! let sink: arbiter::events::SharedSink = bus.clone();
//!
//! while let Ok(event) = eliminations.recv().await {
//!     println!("{} is out", event.player().unwrap_or("?"));
//! }
//! ```

pub mod bus;
pub mod sink;
pub mod types;

// Re-export core types
pub use bus::{EventBus, EventBusExt, EventFilter, FilteredReceiver, SharedEventBus};
pub use sink::{MemorySink, NullSink, ProgressSink, SharedSink};
pub use types::{GameEvent, ProgressNote};
