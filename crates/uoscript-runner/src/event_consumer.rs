use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use uoscript_events::{EventConsumer, EventEnvelope, EventType, ScriptEventType, SystemEvent};

/// Event consumer that logs events to the console (for CLI version)
#[derive(Default)]
pub struct LoggingConsumer;

impl LoggingConsumer {
    pub fn new() -> Self {
        Self
    }
}

impl EventConsumer for LoggingConsumer {
    fn handle_event(&mut self, envelope: EventEnvelope) {
        match envelope.event {
            EventType::Host(event) => {
                debug!(target: "events", "#{} host event: {:?}", envelope.context.sequence, event);
            }
            EventType::System(SystemEvent::SessionStarted { session_id }) => {
                info!(target: "events", "Session {} started", session_id);
            }
            EventType::System(SystemEvent::Shutdown { session_id }) => {
                info!(target: "events", "Session {} shutting down", session_id);
            }
            EventType::System(SystemEvent::ScriptEvent {
                script_id,
                task,
                event_type,
            }) => match event_type {
                ScriptEventType::Loaded => {
                    info!(target: "events", "Script loaded: {} ({})", script_id, task);
                }
                ScriptEventType::Completed => {
                    info!(target: "events", "Script completed: {} ({})", script_id, task);
                }
                ScriptEventType::Terminated => {
                    info!(target: "events", "Script terminated: {} ({})", script_id, task);
                }
                ScriptEventType::Error { message } => {
                    error!(target: "events", "Script error {} ({}): {}", script_id, task, message);
                }
                ScriptEventType::Log { message } => {
                    debug!(target: "events", "Script log {}: {}", script_id, message);
                }
            },
        }
    }
}

/// Forwards envelopes from the bus to consumers living on the session thread
pub struct EventPump {
    rx: broadcast::Receiver<EventEnvelope>,
    consumers: Vec<Box<dyn EventConsumer>>,
}

impl EventPump {
    pub fn new(rx: broadcast::Receiver<EventEnvelope>) -> Self {
        Self {
            rx,
            consumers: Vec::new(),
        }
    }

    pub fn with_consumer(mut self, consumer: impl EventConsumer) -> Self {
        self.consumers.push(Box::new(consumer));
        self
    }

    /// Deliver everything queued so far. Returns the number of envelopes delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => {
                    for consumer in &mut self.consumers {
                        consumer.handle_event(envelope.clone());
                    }
                    delivered += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(target: "events", "Event pump lagged, skipped {} event(s)", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return delivered,
            }
        }
    }
}
