//! Broadcast event bus
//!
//! Pub/sub fan-out over Tokio broadcast channels. Publishing never blocks
//! and never fails; events published with no subscribers are simply
//! dropped.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::sink::ProgressSink;
use super::types::{GameEvent, ProgressNote};

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Event bus with separate channels for events and progress notes
pub struct EventBus {
    /// Broadcast sender for structured game events
    events: broadcast::Sender<GameEvent>,

    /// Broadcast sender for human-readable progress notes
    notes: broadcast::Sender<ProgressNote>,
}

impl EventBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (notes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { events, notes }
    }

    /// Create a shared reference to this event bus
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: GameEvent) {
        let event_type = event.event_type();
        match self.events.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "event published"),
            Err(_) => debug!(event_type, "event published (no receivers)"),
        }
    }

    /// Publish a progress note to all note subscribers
    pub fn note(&self, note: ProgressNote) {
        debug!(round = note.round, phase = %note.phase, "{}", note.message);
        let _ = self.notes.send(note);
    }

    /// Subscribe to game events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Subscribe to progress notes
    pub fn subscribe_notes(&self) -> broadcast::Receiver<ProgressNote> {
        self.notes.subscribe()
    }

    /// Get the number of current event subscribers
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Check if the bus has any event subscribers
    pub fn has_subscribers(&self) -> bool {
        self.events.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for EventBus {
    fn note(&self, note: ProgressNote) {
        EventBus::note(self, note);
    }

    fn publish(&self, event: GameEvent) {
        EventBus::publish(self, event);
    }
}

/// Event filter for selective subscription
pub struct EventFilter {
    /// Filter by event types
    pub event_types: Option<Vec<String>>,
    /// Filter by the player the event is about
    pub player: Option<String>,
}

impl EventFilter {
    /// Create a new empty filter (matches all events)
    pub fn new() -> Self {
        Self {
            event_types: None,
            player: None,
        }
    }

    /// Filter by event types
    pub fn types(mut self, event_types: Vec<&str>) -> Self {
        self.event_types = Some(event_types.into_iter().map(String::from).collect());
        self
    }

    /// Filter by player
    pub fn player(mut self, player: &str) -> Self {
        self.player = Some(player.to_string());
        self
    }

    /// Check if an event matches this filter
    pub fn matches(&self, event: &GameEvent) -> bool {
        if let Some(ref types) = self.event_types {
            if !types.iter().any(|t| t == event.event_type()) {
                return false;
            }
        }

        if let Some(ref player) = self.player {
            match event.player() {
                Some(subject) if subject == player => {}
                _ => return false,
            }
        }

        true
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Filtered event receiver that only yields matching events
pub struct FilteredReceiver {
    receiver: broadcast::Receiver<GameEvent>,
    filter: EventFilter,
}

impl FilteredReceiver {
    pub fn new(receiver: broadcast::Receiver<GameEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event
    pub async fn recv(&mut self) -> Result<GameEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }
}

/// Extension trait for subscribing with filters
pub trait EventBusExt {
    /// Subscribe with a filter
    fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver;
}

impl EventBusExt for EventBus {
    fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        FilteredReceiver::new(self.subscribe(), filter)
    }
}

impl EventBusExt for SharedEventBus {
    fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        FilteredReceiver::new(self.subscribe(), filter)
    }
}
