use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use super::Script;
use super::context::{ScriptApi, Session, SharedSession};
use super::error::{ScriptError, ScriptLoadError, ScriptResult};
use super::task::{SharedControl, Suspension, TaskEntry, TaskStatus};
use super::timer::TimerManager;
use super::wait::{Evaluation, WaitCondition};
use uoscript_client::client::{ClientAction, GameState, HostEvent, SlotRef, TaskId};
use uoscript_client::config::EngineConfig;
use uoscript_events::{
    EventConsumer, EventEnvelope, EventSender, EventSource, EventType, ScriptEventType,
    SystemEvent,
};

/// A task that reached a final status
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task: TaskId,
    pub script_id: String,
    pub status: TaskStatus,
}

/// What happened during one tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Tasks that finished this tick, in the order they finished
    pub finished: Vec<TaskOutcome>,
    /// Tasks resumed during the run phase
    pub resumed: usize,
    /// Suspended tasks made runnable for the next tick
    pub woken: usize,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.finished.is_empty() && self.resumed == 0 && self.woken == 0
    }
}

/// How a finishing task gives up the slots it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimRelease {
    /// Hand the request back so another waiter can take it
    Release,
    /// Withdraw the request from the host unless someone else is waiting on it
    Discard,
}

/// Owns every script task of one session and drives them tick by tick
pub struct ScriptEngine {
    session: SharedSession,
    /// In spawn order
    tasks: Vec<TaskEntry>,
    timers: TimerManager,
    next_task: u64,
    /// Counts suspensions so wakes are served first come, first served
    next_order: u64,
    tick_interval: Duration,
}

impl ScriptEngine {
    pub fn new(config: &EngineConfig, action_tx: UnboundedSender<ClientAction>) -> Self {
        let session = Session {
            state: GameState::new(config),
            action_tx,
            events: None,
            now: Instant::now(),
        };
        Self {
            session: Rc::new(RefCell::new(session)),
            tasks: Vec::new(),
            timers: TimerManager::new(),
            next_task: 1,
            next_order: 0,
            tick_interval: config.tick_interval(),
        }
    }

    /// Publish task lifecycle events on this sender
    pub fn with_events(self, events: EventSender) -> Self {
        self.session.borrow_mut().events = Some(events);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // ===== Spawning =====

    /// Create a Runnable task from a script. It first runs on the next tick.
    pub fn spawn(&mut self, script: &dyn Script) -> Result<TaskId, ScriptLoadError> {
        debug!(target: "scripting", "Spawning script: {} ({})", script.name(), script.id());
        let (id, api, control) = self.prepare(script.id());
        let body = script.start(api).inspect_err(|e| {
            error!(target: "scripting", "Failed to start {}: {}", script.id(), e);
        })?;
        Ok(self.push(id, script.id(), control, body))
    }

    /// Spawn an ad-hoc body that is not a registered script
    pub fn spawn_fn<F, Fut>(&mut self, script_id: &str, body: F) -> TaskId
    where
        F: FnOnce(ScriptApi) -> Fut,
        Fut: Future<Output = ScriptResult> + 'static,
    {
        let (id, api, control) = self.prepare(script_id);
        self.push(id, script_id, control, body(api).boxed_local())
    }

    fn prepare(&mut self, script_id: &str) -> (TaskId, ScriptApi, SharedControl) {
        let id = TaskId(self.next_task);
        self.next_task += 1;
        let control = SharedControl::default();
        let api = ScriptApi::new(id, script_id, self.session.clone(), control.clone());
        (id, api, control)
    }

    fn push(
        &mut self,
        id: TaskId,
        script_id: &str,
        control: SharedControl,
        body: LocalBoxFuture<'static, ScriptResult>,
    ) -> TaskId {
        self.tasks.push(TaskEntry {
            id,
            script_id: script_id.to_string(),
            body: Some(body),
            control,
            status: TaskStatus::Runnable,
            suspension: None,
        });
        info!(target: "scripting", "Started {} as {}", script_id, id);
        self.lifecycle(id, script_id, ScriptEventType::Loaded);
        id
    }

    // ===== Host events =====

    /// Apply a host event to the shared state, sending whatever it triggers
    pub fn apply(&mut self, event: HostEvent) {
        let mut session = self.session.borrow_mut();
        let actions = session.state.apply(event);
        session.send_all(actions);
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.session.borrow().state)
    }

    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.session.borrow_mut().state)
    }

    // ===== Ticking =====

    /// Run one scheduler step at tick time `now`.
    ///
    /// Every Runnable task is resumed once in spawn order. Suspended tasks are then
    /// checked in the order they suspended; a task whose wait resolved becomes
    /// Runnable and observes the result when it is resumed on the next tick.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        self.session.borrow_mut().now = now;
        let mut report = TickReport::default();

        for index in 0..self.tasks.len() {
            if self.tasks[index].status == TaskStatus::Runnable {
                report.resumed += 1;
                self.resume(index, now, &mut report);
            }
        }

        let fired: HashSet<TaskId> = self
            .timers
            .tick(now)
            .into_iter()
            .map(|(_, owner)| owner)
            .collect();
        if !fired.is_empty() {
            debug!(target: "scripting", "Deadlines reached: {:?}", fired);
        }

        let mut waiting: Vec<(u64, usize)> = self
            .tasks
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.suspension.as_ref().map(|s| (s.order, index)))
            .collect();
        waiting.sort_unstable();

        for (_, index) in waiting {
            if self.evaluate(index, &fired) {
                report.woken += 1;
            }
        }
        report
    }

    fn resume(&mut self, index: usize, now: Instant, report: &mut TickReport) {
        let entry = &mut self.tasks[index];
        let Some(body) = entry.body.as_mut() else {
            return;
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        let polled = panic::catch_unwind(AssertUnwindSafe(|| body.as_mut().poll(&mut cx)));

        let status = match polled {
            Ok(Poll::Pending) => {
                let request = entry.control.borrow_mut().request.take();
                if let Some(request) = request {
                    let id = entry.id;
                    let timer = request
                        .timeout
                        .map(|timeout| self.timers.schedule_at(now + timeout, id));
                    let entry = &mut self.tasks[index];
                    entry.status = TaskStatus::Suspended;
                    entry.suspension = Some(Suspension {
                        condition: request.condition,
                        order: self.next_order,
                        timer,
                    });
                    self.next_order += 1;
                }
                return;
            }
            Ok(Poll::Ready(Ok(()))) | Ok(Poll::Ready(Err(ScriptError::Exit))) => {
                TaskStatus::Completed
            }
            Ok(Poll::Ready(Err(e))) => TaskStatus::Errored(e.to_string()),
            Err(payload) => TaskStatus::Errored(panic_message(payload)),
        };
        report.finished.push(self.finish(index, status, ClaimRelease::Release));
    }

    /// Check one suspended task. Returns true when it was woken.
    fn evaluate(&mut self, index: usize, fired: &HashSet<TaskId>) -> bool {
        let entry = &self.tasks[index];
        let id = entry.id;
        let Some(suspension) = entry.suspension.as_ref() else {
            return false;
        };

        let evaluation = {
            let mut session = self.session.borrow_mut();
            suspension.condition.evaluate(id, &mut session.state)
        };

        let outcome = match evaluation {
            Evaluation::Satisfied(actions) => {
                self.session.borrow().send_all(actions);
                true
            }
            Evaluation::Failed(actions) => {
                self.session.borrow().send_all(actions);
                false
            }
            Evaluation::NotYet if fired.contains(&id) => {
                // A sleep ends at its deadline; any other wait timed out
                matches!(suspension.condition, WaitCondition::Sleep)
            }
            Evaluation::NotYet => return false,
        };

        let entry = &mut self.tasks[index];
        if let Some(timer) = entry.suspension.take().and_then(|s| s.timer) {
            self.timers.cancel_timer(timer);
        }
        entry.control.borrow_mut().outcome = Some(outcome);
        entry.status = TaskStatus::Runnable;
        debug!(target: "scripting", "{} woken with {}", id, outcome);
        true
    }

    // ===== Finishing =====

    fn finish(&mut self, index: usize, status: TaskStatus, release: ClaimRelease) -> TaskOutcome {
        let entry = &mut self.tasks[index];
        let id = entry.id;
        let script_id = entry.script_id.clone();

        // Dropping the body drops its ScriptApi handles; no session borrow is held here
        let body = entry.body.take();
        entry.suspension = None;
        entry.status = status.clone();
        drop(body);
        self.timers.cancel_owner(id);

        self.give_up_claims(id, release);

        let event_type = match &status {
            TaskStatus::Completed => {
                info!(target: "scripting", "{} ({}) completed", script_id, id);
                ScriptEventType::Completed
            }
            TaskStatus::Errored(message) => {
                error!(target: "scripting", "{} ({}) failed: {}", script_id, id, message);
                ScriptEventType::Error {
                    message: message.clone(),
                }
            }
            _ => {
                info!(target: "scripting", "{} ({}) terminated", script_id, id);
                ScriptEventType::Terminated
            }
        };
        self.lifecycle(id, &script_id, event_type);

        TaskOutcome {
            task: id,
            script_id,
            status,
        }
    }

    fn give_up_claims(&self, id: TaskId, release: ClaimRelease) {
        let mut session = self.session.borrow_mut();
        for slot in session.state.claims_of(id) {
            let contested = release == ClaimRelease::Release || self.is_awaited(slot, id);
            if contested {
                debug!(target: "scripting", "{} released {:?}", id, slot);
                session.state.release_claim(slot, id);
            } else if let Some(action) = session.state.discard_claim(slot, id) {
                debug!(target: "scripting", "{} withdrew {:?}", id, slot);
                session.send(action);
            }
        }
    }

    /// Whether a suspended task other than `except` would take a response from `slot`
    fn is_awaited(&self, slot: SlotRef, except: TaskId) -> bool {
        self.tasks.iter().any(|entry| {
            entry.id != except
                && entry
                    .suspension
                    .as_ref()
                    .is_some_and(|s| s.condition.waits_on(slot))
        })
    }

    fn lifecycle(&self, task: TaskId, script_id: &str, event_type: ScriptEventType) {
        self.session.borrow_mut().publish(
            SystemEvent::ScriptEvent {
                script_id: script_id.to_string(),
                task,
                event_type,
            },
            EventSource::Script,
        );
    }

    // ===== Control =====

    /// Terminate a task regardless of its status. False if it already finished.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if self.tasks[index].status.is_finished() {
            return false;
        }
        self.finish(index, TaskStatus::Terminated, ClaimRelease::Discard);
        true
    }

    pub fn cancel_all(&mut self) -> usize {
        let live: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|entry| !entry.status.is_finished())
            .map(|entry| entry.id)
            .collect();
        live.into_iter().filter(|id| self.cancel(*id)).count()
    }

    /// Cancel every task and forget session-scoped names
    pub fn shutdown(&mut self) {
        let cancelled = self.cancel_all();
        if cancelled > 0 {
            debug!(target: "scripting", "Cancelled {} task(s) on shutdown", cancelled);
        }
        self.session.borrow_mut().state.clear();
    }

    /// Drop finished tasks, returning how each ended
    pub fn reap(&mut self) -> Vec<TaskOutcome> {
        let (finished, live): (Vec<TaskEntry>, Vec<TaskEntry>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|entry| entry.status.is_finished());
        self.tasks = live;
        finished
            .into_iter()
            .map(|entry| TaskOutcome {
                task: entry.id,
                script_id: entry.script_id,
                status: entry.status,
            })
            .collect()
    }

    // ===== Introspection =====

    fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|entry| entry.id == id)
    }

    pub fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.index_of(id).map(|index| self.tasks[index].status.clone())
    }

    /// Tasks known to the engine, finished ones included until reaped
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn running_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|entry| !entry.status.is_finished())
            .count()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|entry| entry.id).collect()
    }

    /// Earliest pending deadline, for runners that sleep between ticks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}

impl Drop for ScriptEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

/// Wrapper around ScriptEngine that implements EventConsumer trait
pub struct ScriptConsumer {
    engine: ScriptEngine,
}

impl ScriptConsumer {
    pub fn new(engine: ScriptEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScriptEngine {
        &mut self.engine
    }
}

impl EventConsumer for ScriptConsumer {
    fn handle_event(&mut self, envelope: EventEnvelope) {
        match envelope.event {
            EventType::Host(event) => self.engine.apply(event),
            EventType::System(SystemEvent::Shutdown { .. }) => self.engine.shutdown(),
            // Lifecycle events are the engine's own output
            EventType::System(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uoscript_client::client::target::CursorKind;

    fn engine() -> (ScriptEngine, mpsc::UnboundedReceiver<ClientAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ScriptEngine::new(&EngineConfig::default(), tx), rx)
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_task_runs_to_completion() {
        let (mut engine, _rx) = engine();
        let id = engine.spawn_fn("inline", |_api| async { Ok(()) });
        assert_eq!(engine.status(id), Some(TaskStatus::Runnable));

        let report = engine.tick(Instant::now());
        assert_eq!(report.finished.len(), 1);
        assert_eq!(report.finished[0].status, TaskStatus::Completed);
        assert_eq!(engine.running_count(), 0);
    }

    #[test]
    fn test_exit_completes() {
        let (mut engine, _rx) = engine();
        let id = engine.spawn_fn("inline", |api| async move {
            api.exit()?;
            Err(ScriptError::failed("unreachable"))
        });
        engine.tick(Instant::now());
        assert_eq!(engine.status(id), Some(TaskStatus::Completed));
    }

    #[test]
    fn test_error_and_panic_are_contained() {
        let (mut engine, _rx) = engine();
        let failing = engine.spawn_fn("failing", |_api| async {
            Err(ScriptError::failed("no reagents"))
        });
        fn explode() -> ScriptResult {
            panic!("boom")
        }
        let panicking = engine.spawn_fn("panicking", |_api| async { explode() });
        let healthy = engine.spawn_fn("healthy", |_api| async { Ok(()) });

        engine.tick(Instant::now());

        assert_eq!(
            engine.status(failing),
            Some(TaskStatus::Errored("no reagents".to_string()))
        );
        assert_eq!(
            engine.status(panicking),
            Some(TaskStatus::Errored("panicked: boom".to_string()))
        );
        assert_eq!(engine.status(healthy), Some(TaskStatus::Completed));
    }

    #[test]
    fn test_wait_timeout_resolves_false() {
        let (mut engine, _rx) = engine();
        let result = Rc::new(RefCell::new(None));
        let seen = result.clone();
        engine.spawn_fn("waiter", move |api| async move {
            let got = api.target().wait_target(Some(100)).await;
            *seen.borrow_mut() = Some(got);
            Ok(())
        });

        let start = Instant::now();
        engine.tick(start);
        engine.tick(ms(start, 50));
        assert_eq!(*result.borrow(), None);

        let report = engine.tick(ms(start, 100));
        assert_eq!(report.woken, 1);
        engine.tick(ms(start, 150));
        assert_eq!(*result.borrow(), Some(false));
    }

    #[test]
    fn test_cancel_discards_unwanted_claim() {
        let (mut engine, mut rx) = engine();
        let id = engine.spawn_fn("holder", |api| async move {
            api.target().wait_target(None).await;
            // Hold the cursor without answering
            api.sleep(60_000).await;
            Ok(())
        });

        let start = Instant::now();
        engine.tick(start);
        engine.apply(HostEvent::TargetCursorOpened {
            cursor_id: 9,
            kind: CursorKind::Neutral,
        });
        engine.tick(ms(start, 50));
        engine.tick(ms(start, 100));
        assert_eq!(engine.with_state(|s| s.target.slot.owner()), Some(id));

        assert!(engine.cancel(id));
        assert_eq!(engine.status(id), Some(TaskStatus::Terminated));
        assert_eq!(rx.try_recv().ok(), Some(ClientAction::CancelTarget { cursor_id: 9 }));
        assert!(engine.with_state(|s| s.target.slot.is_idle()));

        // Absorbing
        assert!(!engine.cancel(id));
    }

    #[test]
    fn test_reap_drops_finished() {
        let (mut engine, _rx) = engine();
        let done = engine.spawn_fn("done", |_api| async { Ok(()) });
        let sleeping = engine.spawn_fn("sleeping", |api| async move {
            api.sleep(1_000).await;
            Ok(())
        });
        engine.tick(Instant::now());

        let reaped = engine.reap();
        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].task, done);
        assert_eq!(engine.task_ids(), vec![sleeping]);
    }

    #[test]
    fn test_shutdown_terminates_and_clears_aliases() {
        let (mut engine, _rx) = engine();
        let id = engine.spawn_fn("aliaser", |api| async move {
            api.client().set_alias("pet", 0x55);
            api.sleep(1_000).await;
            Ok(())
        });
        engine.tick(Instant::now());
        assert_eq!(engine.with_state(|s| s.find_alias("pet")), Some(0x55));

        engine.shutdown();
        assert_eq!(engine.status(id), Some(TaskStatus::Terminated));
        assert_eq!(engine.with_state(|s| s.find_alias("pet")), None);
    }

    #[test]
    fn test_lifecycle_events_published() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (bus, mut events) = uoscript_events::EventBus::new(16);
        let mut engine =
            ScriptEngine::new(&EngineConfig::default(), tx).with_events(bus.create_sender(1));

        engine.spawn_fn("inline", |_api| async { Ok(()) });
        engine.tick(Instant::now());

        let kinds: Vec<ScriptEventType> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|envelope| match envelope.event {
                EventType::System(SystemEvent::ScriptEvent { event_type, .. }) => Some(event_type),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![ScriptEventType::Loaded, ScriptEventType::Completed]);
    }

    #[test]
    fn test_consumer_applies_host_events() {
        let (engine, _rx) = engine();
        let mut consumer = ScriptConsumer::new(engine);
        consumer.handle_event(EventEnvelope::host_event(
            HostEvent::ConnectionChanged { connected: true },
            1,
            1,
        ));
        assert!(consumer.engine().with_state(|s| s.connected));
    }
}
