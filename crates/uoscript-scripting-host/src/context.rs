use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::api::{
    ClientApi, GumpApi, IgnoreListApi, JournalApi, PlayerApi, PopupMenuApi, PromptApi, TargetApi,
    WorldMapApi,
};
use crate::error::{ScriptError, ScriptResult};
use crate::task::{SharedControl, Suspend};
use crate::wait::WaitCondition;
use uoscript_client::client::{ClientAction, GameState, TaskId};
use uoscript_events::{EventSender, EventSource, ScriptEventType, SystemEvent};

/// State shared by every task of one engine
pub(crate) struct Session {
    pub state: GameState,
    pub action_tx: UnboundedSender<ClientAction>,
    pub events: Option<EventSender>,
    /// Time of the tick currently running
    pub now: Instant,
}

impl Session {
    pub fn send(&self, action: ClientAction) {
        debug!(target: "scripting", "Sending {:?}", action);
        // The host going away is not a script error
        let _ = self.action_tx.send(action);
    }

    pub fn send_all(&self, actions: impl IntoIterator<Item = ClientAction>) {
        for action in actions {
            self.send(action);
        }
    }

    pub fn publish(&mut self, event: SystemEvent, source: EventSource) {
        if let Some(events) = self.events.as_mut() {
            events.publish_system(event, source);
        }
    }
}

pub(crate) type SharedSession = Rc<RefCell<Session>>;

/// Handle through which a script body talks to the engine.
///
/// Non-blocking calls read or change the session immediately. Blocking calls
/// are `async` and suspend the task until the scheduler resolves them.
#[derive(Clone)]
pub struct ScriptApi {
    task: TaskId,
    script_id: Rc<str>,
    session: SharedSession,
    control: SharedControl,
}

impl ScriptApi {
    pub(crate) fn new(
        task: TaskId,
        script_id: &str,
        session: SharedSession,
        control: SharedControl,
    ) -> Self {
        Self {
            task,
            script_id: Rc::from(script_id),
            session,
            control,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task
    }

    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    /// Time of the current tick
    pub fn now(&self) -> Instant {
        self.session.borrow().now
    }

    // ===== Global functions =====

    /// End the task. Use as `return api.exit();`.
    pub fn exit(&self) -> ScriptResult {
        Err(ScriptError::Exit)
    }

    pub fn log(&self, message: impl Display) {
        let message = message.to_string();
        info!(target: "script", "[{}] {}", self.script_id, message);
        self.session.borrow_mut().publish(
            SystemEvent::ScriptEvent {
                script_id: self.script_id.to_string(),
                task: self.task,
                event_type: ScriptEventType::Log { message },
            },
            EventSource::Script,
        );
    }

    /// Suspend for at least `milliseconds` of tick time
    pub async fn sleep(&self, milliseconds: u64) {
        self.suspend(WaitCondition::Sleep, Some(milliseconds)).await;
    }

    // ===== Namespaces =====

    pub fn client(&self) -> ClientApi<'_> {
        ClientApi::new(self)
    }

    pub fn player(&self) -> PlayerApi<'_> {
        PlayerApi::new(self)
    }

    pub fn target(&self) -> TargetApi<'_> {
        TargetApi::new(self)
    }

    pub fn journal(&self) -> JournalApi<'_> {
        JournalApi::new(self)
    }

    pub fn gump(&self) -> GumpApi<'_> {
        GumpApi::new(self)
    }

    pub fn popup_menu(&self) -> PopupMenuApi<'_> {
        PopupMenuApi::new(self)
    }

    pub fn prompt(&self) -> PromptApi<'_> {
        PromptApi::new(self)
    }

    pub fn world_map(&self) -> WorldMapApi<'_> {
        WorldMapApi::new(self)
    }

    pub fn ignore_list(&self) -> IgnoreListApi<'_> {
        IgnoreListApi::new(self)
    }

    // ===== Plumbing for the namespaces =====

    pub(crate) fn suspend(&self, condition: WaitCondition, timeout_ms: Option<u64>) -> Suspend {
        Suspend::new(
            self.control.clone(),
            condition,
            timeout_ms.map(Duration::from_millis),
        )
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.session.borrow().state)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.session.borrow_mut().state)
    }

    pub(crate) fn send(&self, action: ClientAction) {
        self.session.borrow().send(action);
    }

    /// Run a state change and send whatever commands it produced
    pub(crate) fn act<I>(&self, f: impl FnOnce(&mut GameState) -> I)
    where
        I: IntoIterator<Item = ClientAction>,
    {
        let mut session = self.session.borrow_mut();
        let actions = f(&mut session.state);
        session.send_all(actions);
    }
}
