use tracing::debug;

use crate::context::ScriptApi;
use crate::wait::{TargetWait, WaitCondition};
use uoscript_client::client::target::TargetChoice;
use uoscript_client::client::{Position, Serial};

pub struct TargetApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> TargetApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    // ===== Properties =====

    pub fn has_target(&self) -> bool {
        self.api.read(|state| state.target.has_target())
    }

    /// Serial of the last object targeted, 0 for ground targets
    pub fn target_serial(&self) -> Serial {
        self.api
            .read(|state| state.target.last().map(|last| last.serial).unwrap_or_default())
    }

    /// Graphic of the last target
    pub fn target_type(&self) -> u16 {
        self.api
            .read(|state| state.target.last().map(|last| last.graphic).unwrap_or_default())
    }

    fn last_position(&self) -> Position {
        self.api
            .read(|state| state.target.last().map(|last| last.position).unwrap_or_default())
    }

    pub fn target_x(&self) -> i32 {
        self.last_position().x
    }

    pub fn target_y(&self) -> i32 {
        self.last_position().y
    }

    pub fn target_z(&self) -> i32 {
        self.last_position().z
    }

    // ===== Answering =====

    fn set(&self, choice: TargetChoice) {
        let task = self.api.task_id();
        self.api.act(|state| state.target_or_queue(task, choice));
    }

    /// Target an object now, or when the next cursor arrives. False if the object is unknown.
    pub fn set_target_client(&self, serial: Serial) -> bool {
        if !self.api.read(|state| state.world.contains(serial)) {
            debug!(target: "scripting", "{} cannot target missing object 0x{:08X}", self.api.task_id(), serial);
            return false;
        }
        self.set(TargetChoice::Object(serial));
        true
    }

    pub fn set_target_to_self(&self) {
        self.set(TargetChoice::Player);
    }

    pub fn set_target_to_loc(&self, x: i32, y: i32, z: i32) {
        self.set(TargetChoice::Location(Position::new(x, y, z)));
    }

    // ===== Waiting =====

    async fn wait(&self, wait: TargetWait, timeout: Option<u64>) -> bool {
        self.api.suspend(WaitCondition::Target(wait), timeout).await
    }

    /// Wait for a cursor and claim it; answer with `set_target_*`
    pub async fn wait_target(&self, timeout: Option<u64>) -> bool {
        self.wait(TargetWait::Any, timeout).await
    }

    pub async fn wait_target_self(&self, timeout: Option<u64>) -> bool {
        self.wait(TargetWait::SelfTarget, timeout).await
    }

    /// Item resolved when the cursor arrives; false (and the cursor cancelled) if none exists
    pub async fn wait_target_type(&self, graphic: u16, timeout: Option<u64>) -> bool {
        self.wait(TargetWait::Type(graphic), timeout).await
    }

    pub async fn wait_target_object(&self, serial: Serial, timeout: Option<u64>) -> bool {
        self.wait(TargetWait::Object(serial), timeout).await
    }

    pub async fn wait_target_tile(
        &self,
        tile_type: u16,
        x: i32,
        y: i32,
        z: i32,
        timeout: Option<u64>,
    ) -> bool {
        let wait = TargetWait::Tile {
            graphic: tile_type,
            position: Position::new(x, y, z),
        };
        self.wait(wait, timeout).await
    }

    // ===== Cancelling =====

    pub fn cancel(&self) {
        self.api.act(|state| state.cancel_target());
    }

    pub fn clear_queue(&self) {
        self.api.act(|state| state.clear_target_queue());
    }

    /// Target the alias's holder, then rotate the alias to its previous holder
    pub fn perform_target_from_list(&self, alias: &str) -> bool {
        let task = self.api.task_id();
        let answered = self.api.write(|state| {
            let serial = state.find_alias(alias)?;
            if !state.world.contains(serial) || !state.target.has_target() {
                return None;
            }
            let action = state.answer_target(task, TargetChoice::Object(serial)).ok()?;
            state.aliases.promote(alias);
            Some(action)
        });
        match answered {
            Some(action) => {
                self.api.send(action);
                true
            }
            None => false,
        }
    }
}
