use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::event_consumer::EventPump;
use uoscript_client::client::HostEvent;
use uoscript_scripting_host::{ScriptEngine, TaskOutcome, TaskStatus};

/// Totals for one live session
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub host_events: u64,
    pub finished: Vec<TaskOutcome>,
}

/// Drive an engine from a live host until the host goes away or shutdown is signalled.
///
/// Host events are applied as soon as they arrive. The engine ticks on its own
/// interval; a tick that runs late is not made up for. Without a shutdown receiver
/// the session stops on Ctrl+C.
pub async fn run_session(
    engine: &mut ScriptEngine,
    mut host_rx: mpsc::UnboundedReceiver<HostEvent>,
    mut shutdown_rx: Option<watch::Receiver<bool>>,
    mut pump: Option<&mut EventPump>,
) -> SessionSummary {
    let tick_interval = engine.tick_interval();
    let mut summary = SessionSummary::default();
    let mut last_tick = Instant::now();

    info!("Session started, ticking every {:?}", tick_interval);

    loop {
        tokio::select! {
            event = host_rx.recv() => {
                match event {
                    Some(event) => {
                        debug!("Host event: {:?}", event);
                        engine.apply(event);
                        summary.host_events += 1;
                    }
                    None => {
                        info!("Host channel closed");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(last_tick + tick_interval) => {
                last_tick = Instant::now();
                let report = engine.tick(last_tick.into_std());
                summary.ticks += 1;
                for outcome in report.finished {
                    log_outcome(&outcome);
                    summary.finished.push(outcome);
                }
                engine.reap();
                if let Some(pump) = pump.as_deref_mut() {
                    pump.pump();
                }
            }
            _ = async {
                if let Some(ref mut rx) = shutdown_rx {
                    rx.changed().await
                } else {
                    std::future::pending().await
                }
            } => {
                info!("Session received shutdown signal");
                break;
            }
            _ = tokio::signal::ctrl_c(), if shutdown_rx.is_none() => {
                info!("Received Ctrl+C, shutting down gracefully...");
                break;
            }
        }
    }

    engine.shutdown();
    summary.finished.extend(engine.reap());
    if let Some(pump) = pump {
        pump.pump();
    }
    info!(
        "Session stopped after {} tick(s), {} host event(s)",
        summary.ticks, summary.host_events
    );
    summary
}

fn log_outcome(outcome: &TaskOutcome) {
    match &outcome.status {
        TaskStatus::Errored(message) => {
            warn!("{} ({}) failed: {}", outcome.script_id, outcome.task, message)
        }
        status => info!("{} ({}) finished: {:?}", outcome.script_id, outcome.task, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uoscript_client::client::ClientAction;
    use uoscript_client::config::EngineConfig;
    use uoscript_events::EventBus;

    use crate::event_consumer::LoggingConsumer;

    fn engine(tick_interval_ms: u64) -> (ScriptEngine, mpsc::UnboundedReceiver<ClientAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = EngineConfig {
            tick_interval_ms,
            ..EngineConfig::default()
        };
        (ScriptEngine::new(&config, tx), rx)
    }

    #[tokio::test]
    async fn test_session_runs_until_shutdown() {
        let (mut engine, mut actions) = engine(10);
        engine.spawn_fn("greeter", |api| async move {
            api.sleep(20).await;
            api.client().sys_msg("hi", None);
            Ok(())
        });
        let (_host_tx, host_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let _ = shutdown_tx.send(true);
        });

        let summary = run_session(&mut engine, host_rx, Some(shutdown_rx), None).await;

        assert!(summary.ticks > 2);
        assert_eq!(summary.finished.len(), 1);
        assert_eq!(summary.finished[0].status, TaskStatus::Completed);
        assert_eq!(
            actions.try_recv().unwrap(),
            ClientAction::SystemMessage {
                text: "hi".to_string(),
                hue: 0x3B2
            }
        );
    }

    #[tokio::test]
    async fn test_closed_host_ends_session_and_cancels_tasks() {
        let (bus, rx) = EventBus::new(64);
        let (engine, _actions) = engine(10);
        let mut engine = engine.with_events(bus.create_sender(1));
        let waiter = engine.spawn_fn("waiter", |api| async move {
            api.target().wait_target(None).await;
            Ok(())
        });
        let mut pump = EventPump::new(rx).with_consumer(LoggingConsumer::new());

        let (host_tx, host_rx) = mpsc::unbounded_channel();
        host_tx
            .send(HostEvent::ConnectionChanged { connected: true })
            .unwrap();
        drop(host_tx);

        let summary = run_session(&mut engine, host_rx, None, Some(&mut pump)).await;

        assert_eq!(summary.host_events, 1);
        assert_eq!(summary.finished.len(), 1);
        assert_eq!(summary.finished[0].task, waiter);
        assert_eq!(summary.finished[0].status, TaskStatus::Terminated);
    }
}
