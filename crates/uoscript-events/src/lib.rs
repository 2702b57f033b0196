//! Event types shared by the engine, the runner and their consumers
//!
//! Host events and script lifecycle events travel in an `EventEnvelope` so that
//! consumers can be written without depending on the scheduler crate.

use std::time::Instant;
use tokio::sync::broadcast;

use uoscript_client::client::{HostEvent, TaskId};

// ============================================================================
// Event Source and Context
// ============================================================================

/// Source of the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Decoded by the host client
    Host,
    /// Raised by a running script
    Script,
    /// Session lifecycle
    System,
}

/// Context information attached to all events
#[derive(Debug, Clone)]
pub struct EventContext {
    pub session_id: u32,
    /// Sequence number for this event, relative to the session
    pub sequence: u64,
}

impl EventContext {
    pub fn new(session_id: u32, sequence: u64) -> Self {
        Self {
            session_id,
            sequence,
        }
    }
}

// ============================================================================
// Event Types
// ============================================================================

/// Script task lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEventType {
    Loaded,
    Completed,
    Error { message: String },
    Terminated,
    Log { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    SessionStarted {
        session_id: u32,
    },
    ScriptEvent {
        script_id: String,
        task: TaskId,
        event_type: ScriptEventType,
    },
    Shutdown {
        session_id: u32,
    },
}

#[derive(Debug, Clone)]
pub enum EventType {
    Host(HostEvent),
    System(SystemEvent),
}

// ============================================================================
// Event Envelope
// ============================================================================

#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub event: EventType,
    pub context: EventContext,
    pub timestamp: Instant,
    pub source: EventSource,
}

impl EventEnvelope {
    pub fn new(event: EventType, context: EventContext, source: EventSource) -> Self {
        Self {
            event,
            context,
            timestamp: Instant::now(),
            source,
        }
    }

    pub fn host_event(host_event: HostEvent, session_id: u32, sequence: u64) -> Self {
        let context = EventContext::new(session_id, sequence);
        Self::new(EventType::Host(host_event), context, EventSource::Host)
    }

    pub fn system_event(
        system_event: SystemEvent,
        session_id: u32,
        sequence: u64,
        source: EventSource,
    ) -> Self {
        let context = EventContext::new(session_id, sequence);
        Self::new(EventType::System(system_event), context, source)
    }

    pub fn extract_host_event(&self) -> Option<HostEvent> {
        match &self.event {
            EventType::Host(host_event) => Some(host_event.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Publishing half handed to whatever raises events for one session
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: broadcast::Sender<EventEnvelope>,
    session_id: u32,
    sequence: u64,
}

impl EventSender {
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn publish(&self, envelope: EventEnvelope) {
        // No subscribers is not an error
        let _ = self.sender.send(envelope);
    }

    pub fn publish_system(&mut self, event: SystemEvent, source: EventSource) {
        self.sequence += 1;
        self.publish(EventEnvelope::system_event(
            event,
            self.session_id,
            self.sequence,
            source,
        ));
    }
}

/// Fan-out of envelopes to every subscribed consumer
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<EventEnvelope>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn create_sender(&self, session_id: u32) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
            session_id,
            sequence: 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// ============================================================================
// Event Consumer Trait
// ============================================================================

/// Something driven by event envelopes: the script engine, a logger, a recorder
pub trait EventConsumer: 'static {
    fn handle_event(&mut self, envelope: EventEnvelope);
}
