//! Progress sinks
//!
//! The engine reports through a [`ProgressSink`] and never waits on, or
//! fails because of, its observers. [`super::bus::EventBus`] is the
//! broadcast-backed implementation; [`NullSink`] discards everything;
//! [`MemorySink`] keeps everything for later inspection.

use std::sync::{Arc, Mutex};

use super::types::{GameEvent, ProgressNote};

/// Shared reference to a progress sink
pub type SharedSink = Arc<dyn ProgressSink>;

/// Receives progress notes and game events as they happen
pub trait ProgressSink: Send + Sync {
    /// A human-readable progress update
    fn note(&self, note: ProgressNote);

    /// A structured game event
    fn publish(&self, event: GameEvent);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn note(&self, _note: ProgressNote) {}
    fn publish(&self, _event: GameEvent) {}
}

/// Sink that records everything it sees, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    notes: Mutex<Vec<ProgressNote>>,
    events: Mutex<Vec<GameEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of all notes seen so far
    pub fn notes(&self) -> Vec<ProgressNote> {
        self.notes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot of all events seen so far
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event type strings in arrival order
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.event_type()).collect()
    }
}

impl ProgressSink for MemorySink {
    fn note(&self, note: ProgressNote) {
        self.notes.lock().unwrap_or_else(|e| e.into_inner()).push(note);
    }

    fn publish(&self, event: GameEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Phase;
    use crate::roles::Winner;
    use chrono::Utc;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();

        sink.note(ProgressNote::new("t1", 0, Phase::Night, "starting"));
        sink.publish(GameEvent::GameOver {
            winner: Winner::Predators,
            rounds: 3,
            timestamp: Utc::now(),
        });

        assert_eq!(sink.notes().len(), 1);
        assert_eq!(sink.event_types(), vec!["game_over"]);
    }

    #[test]
    fn test_null_sink_is_silent() {
        let sink = NullSink;
        sink.note(ProgressNote::new("t1", 1, Phase::Day, "ignored"));
        sink.publish(GameEvent::PhaseChange {
            phase: Phase::Day,
            round: 1,
            timestamp: Utc::now(),
        });
    }
}
