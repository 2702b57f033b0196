use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};

use uoscript_client::client::HostEvent;
use uoscript_scripting_host::{ScriptEngine, TaskOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error reading replay: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse replay: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A host event applied just before the tick it is scheduled for
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayEvent {
    pub at_tick: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// Recorded host events, read from a TOML file of `[[events]]` tables
///
/// ```toml
/// [[events]]
/// at_tick = 2
/// type = "TargetCursorOpened"
/// cursor_id = 7
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplayFeed {
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

impl FromStr for ReplayFeed {
    type Err = ReplayError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}

impl ReplayFeed {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let feed: Self = fs::read_to_string(path)?.parse()?;
        info!("Loaded {} replay event(s) from {}", feed.events.len(), path.display());
        Ok(feed)
    }

    /// Events scheduled for `tick`, in file order
    pub fn events_for_tick(&self, tick: u64) -> impl Iterator<Item = &HostEvent> {
        self.events
            .iter()
            .filter(move |event| event.at_tick == tick)
            .map(|event| &event.event)
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.events.iter().map(|event| event.at_tick).max()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub host_events: u64,
    pub finished: Vec<TaskOutcome>,
}

/// Run `ticks` ticks against a recorded feed on simulated time.
///
/// Tick `n` happens at `start + n * tick_interval`, so timeouts behave the same on
/// every run regardless of how fast the machine is.
pub fn run_replay(engine: &mut ScriptEngine, feed: &ReplayFeed, ticks: u64) -> ReplaySummary {
    let tick_interval = engine.tick_interval();
    let start = Instant::now();
    let mut summary = ReplaySummary::default();

    for tick in 0..ticks {
        for event in feed.events_for_tick(tick) {
            debug!("Replaying at tick {}: {:?}", tick, event);
            engine.apply(event.clone());
            summary.host_events += 1;
        }
        let now = start + tick_interval * tick_offset(tick);
        let report = engine.tick(now);
        summary.finished.extend(report.finished);
        summary.ticks += 1;
    }
    engine.reap();
    summary
}

fn tick_offset(tick: u64) -> u32 {
    u32::try_from(tick).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uoscript_client::client::world::{Entity, Item};
    use uoscript_client::client::{ClientAction, Position};
    use uoscript_client::config::EngineConfig;
    use uoscript_scripting_host::TaskStatus;

    const FEED: &str = r#"
        [[events]]
        at_tick = 0
        type = "PlayerAssigned"
        serial = 1

        [[events]]
        at_tick = 2
        type = "TargetCursorOpened"
        cursor_id = 7
    "#;

    #[test]
    fn test_parse_feed() {
        let feed: ReplayFeed = FEED.parse().unwrap();
        assert_eq!(feed.events.len(), 2);
        assert_eq!(feed.last_tick(), Some(2));
        assert_eq!(
            feed.events_for_tick(0).collect::<Vec<_>>(),
            vec![&HostEvent::PlayerAssigned { serial: 1 }]
        );
        assert_eq!(feed.events_for_tick(1).count(), 0);
    }

    #[test]
    fn test_unknown_event_type_is_an_error() {
        let result: Result<ReplayFeed, _> = "[[events]]\nat_tick = 0\ntype = \"Teleported\"".parse();
        assert!(matches!(result, Err(ReplayError::Parse(_))));
    }

    #[test]
    fn test_replay_answers_recorded_cursor() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = ScriptEngine::new(&EngineConfig::default(), tx);
        engine.apply(HostEvent::EntityUpserted {
            entity: Entity::item(0x99, 0x0E21, Position::default(), Item::default()),
        });
        let task = engine.spawn_fn("targeter", |api| async move {
            if api.target().wait_target(None).await {
                api.target().set_target_client(0x99);
            }
            Ok(())
        });

        let feed: ReplayFeed = FEED.parse().unwrap();
        let summary = run_replay(&mut engine, &feed, 5);

        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.host_events, 2);
        assert_eq!(summary.finished.len(), 1);
        assert_eq!(summary.finished[0].task, task);
        assert_eq!(summary.finished[0].status, TaskStatus::Completed);
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientAction::TargetObject {
                cursor_id: 7,
                serial: 0x99
            }
        );
    }

    #[test]
    fn test_replay_times_out_on_simulated_clock() {
        fn impatient() -> ScriptEngine {
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut engine = ScriptEngine::new(&EngineConfig::default(), tx);
            engine.spawn_fn("impatient", |api| async move {
                api.target().wait_target(Some(100)).await;
                Ok(())
            });
            engine
        }

        // 50ms ticks: suspends at tick 0, deadline reached at tick 2, resumes at tick 3
        let summary = run_replay(&mut impatient(), &ReplayFeed::default(), 3);
        assert!(summary.finished.is_empty());
        let summary = run_replay(&mut impatient(), &ReplayFeed::default(), 4);
        assert_eq!(summary.finished.len(), 1);
        assert_eq!(summary.finished[0].status, TaskStatus::Completed);
    }
}
