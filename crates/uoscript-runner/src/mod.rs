mod event_consumer;
pub mod logging;
mod replay;
mod session;

pub use event_consumer::{EventPump, LoggingConsumer};
pub use replay::{ReplayError, ReplayEvent, ReplayFeed, ReplaySummary, run_replay};
pub use session::{SessionSummary, run_session};
