use tracing::{debug, warn};

use super::aliases::AliasTable;
use super::events::{ClientAction, HostEvent};
use super::gumps::{GumpTable, GumpTextEntry};
use super::ignore_list::IgnoreList;
use super::journal::Journal;
use super::popup_menu::{MenuRequest, MenuSelection};
use super::prompt::PromptRequest;
use super::query::EntityQuery;
use super::slots::{AnswerError, InteractionSlot};
use super::target::{LastTarget, TargetChoice, TargetRequest, TargetState};
use super::types::{Layer, Position, Serial, TaskId};
use super::world::World;
use super::world_map::WorldMap;
use crate::config::EngineConfig;

/// One interaction slot, as referenced by a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    Target,
    Gump(u32),
    Prompt,
    Menu,
}

/// Everything scripts can observe: the world plus per-session interaction state
pub struct GameState {
    pub world: World,
    pub aliases: AliasTable,
    pub ignore_list: IgnoreList,
    pub journal: Journal,
    pub target: TargetState,
    pub gumps: GumpTable,
    pub prompt: InteractionSlot<PromptRequest>,
    pub menu: InteractionSlot<MenuRequest>,
    pub world_map: WorldMap,
    pub connected: bool,
    /// Default search range when a query omits one
    pub find_distance: Option<u32>,
    /// Last entity returned by a Next/Previous search
    pub search_cursor: Option<Serial>,
    pub last_object: Option<Serial>,
}

impl GameState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            world: World::new(),
            aliases: AliasTable::new(config.alias_history_limit),
            ignore_list: IgnoreList::new(),
            journal: Journal::new(config.journal_capacity),
            target: TargetState::new(),
            gumps: GumpTable::new(),
            prompt: InteractionSlot::new("prompt"),
            menu: InteractionSlot::new("menu"),
            world_map: WorldMap::new(),
            connected: false,
            find_distance: config.find_distance,
            search_cursor: None,
            last_object: None,
        }
    }

    pub fn query(&self) -> EntityQuery<'_> {
        EntityQuery::new(&self.world, &self.ignore_list)
    }

    /// Apply a host event. Returns commands triggered by it, such as a queued target.
    pub fn apply(&mut self, event: HostEvent) -> Vec<ClientAction> {
        debug!(target: "events", "Applying {:?}", event);
        match event {
            HostEvent::EntityUpserted { entity } => self.world.upsert(entity),
            HostEvent::EntityRemoved { serial } => {
                self.world.remove(serial);
            }
            HostEvent::ItemMoved { serial, container } => self.world.move_item(serial, container),
            HostEvent::PlayerAssigned { serial } => self.world.set_player(serial),
            HostEvent::PlayerStatsUpdated { stats } => self.world.set_player_stats(stats),
            HostEvent::SkillsUpdated { skills } => self.world.set_skills(skills),
            HostEvent::ConnectionChanged { connected } => self.connected = connected,
            HostEvent::JournalAppended {
                text,
                author,
                message_type,
                hue,
            } => {
                self.journal.append(text, author, message_type, hue);
            }
            HostEvent::TargetCursorOpened { cursor_id, kind } => {
                self.target.slot.offer(TargetRequest { cursor_id, kind });
                if let Some(choice) = self.target.dequeue() {
                    return self.answer_unclaimed_target(choice).into_iter().collect();
                }
            }
            HostEvent::TargetCursorClosed => {
                self.target.slot.clear();
            }
            HostEvent::GumpShown { gump } => {
                self.gumps.show(gump);
            }
            HostEvent::GumpClosed { gump_id } => {
                self.gumps.close(gump_id);
            }
            HostEvent::PromptOpened { serial, prompt_id } => {
                self.prompt.offer(PromptRequest { serial, prompt_id });
            }
            HostEvent::PromptClosed => {
                self.prompt.clear();
            }
            HostEvent::MenuShown { menu } => {
                self.menu.offer(menu);
            }
            HostEvent::MenuClosed => {
                self.menu.clear();
            }
        }
        Vec::new()
    }

    /// Resolve an alias: explicit assignments first, then the built-in dynamic names
    pub fn find_alias(&self, name: &str) -> Option<Serial> {
        if let Some(serial) = self.aliases.get(name) {
            return Some(serial);
        }
        match name.to_ascii_lowercase().as_str() {
            "self" | "me" => self.world.player_serial(),
            "backpack" => self.world.player_layer(Layer::Backpack),
            "mount" => self.world.player_layer(Layer::Mount),
            "lasttarget" | "last" => self
                .target
                .last()
                .map(|last| last.serial)
                .filter(|serial| *serial != 0),
            "lastobject" => self.last_object,
            _ => None,
        }
    }

    /// Explicit range, falling back to the session default
    pub fn effective_range(&self, range: Option<u32>) -> Option<u32> {
        range.or(self.find_distance)
    }

    fn target_action(&mut self, request: TargetRequest, choice: TargetChoice) -> ClientAction {
        let cursor_id = request.cursor_id;
        match choice {
            TargetChoice::Object(serial) => {
                let entity = self.world.get(serial);
                self.target.record(LastTarget {
                    serial,
                    graphic: entity.map(|e| e.graphic).unwrap_or_default(),
                    position: self.world.world_position(serial).unwrap_or_default(),
                });
                ClientAction::TargetObject { cursor_id, serial }
            }
            TargetChoice::Player => {
                let serial = self.world.player_serial().unwrap_or_default();
                self.target.record(LastTarget {
                    serial,
                    graphic: self.world.player().map(|p| p.graphic).unwrap_or_default(),
                    position: self.world.player_position().unwrap_or_default(),
                });
                ClientAction::TargetSelf { cursor_id }
            }
            TargetChoice::Location(position) => {
                self.target.record(LastTarget {
                    serial: 0,
                    graphic: 0,
                    position,
                });
                ClientAction::TargetLocation {
                    cursor_id,
                    graphic: 0,
                    position,
                }
            }
            TargetChoice::Tile { graphic, position } => {
                self.target.record(LastTarget {
                    serial: 0,
                    graphic,
                    position,
                });
                ClientAction::TargetLocation {
                    cursor_id,
                    graphic,
                    position,
                }
            }
        }
    }

    fn answer_unclaimed_target(&mut self, choice: TargetChoice) -> Option<ClientAction> {
        if !self.target.slot.is_claimable() {
            return None;
        }
        let request = self.target.slot.clear()?;
        Some(self.target_action(request, choice))
    }

    /// Answer the current cursor on behalf of `task`
    pub fn answer_target(
        &mut self,
        task: TaskId,
        choice: TargetChoice,
    ) -> Result<ClientAction, AnswerError> {
        let request = self.target.slot.answer(task).inspect_err(|e| {
            warn!(target: "scripting", "{} could not answer target cursor: {}", task, e);
        })?;
        Ok(self.target_action(request, choice))
    }

    /// Answer the cursor if one is outstanding, otherwise queue for the next one
    pub fn target_or_queue(&mut self, task: TaskId, choice: TargetChoice) -> Option<ClientAction> {
        if self.target.slot.is_idle() {
            debug!(target: "scripting", "{} queued target {:?}", task, choice);
            self.target.enqueue(choice);
            return None;
        }
        self.answer_target(task, choice).ok()
    }

    /// Force the target slot idle. Emits a cancel only if a cursor was outstanding.
    pub fn cancel_target(&mut self) -> Option<ClientAction> {
        self.target
            .slot
            .clear()
            .map(|request| ClientAction::CancelTarget {
                cursor_id: request.cursor_id,
            })
    }

    pub fn clear_target_queue(&mut self) -> Option<ClientAction> {
        self.target.clear_queue();
        self.cancel_target()
    }

    pub fn reply_gump(
        &mut self,
        task: TaskId,
        gump_id: u32,
        button_id: u32,
        switches: Vec<u32>,
        text_entries: Vec<GumpTextEntry>,
    ) -> Result<ClientAction, AnswerError> {
        let gump = self.gumps.answer(gump_id, task).inspect_err(|e| {
            warn!(target: "scripting", "{} could not reply to gump {}: {}", task, gump_id, e);
        })?;
        Ok(ClientAction::GumpReply {
            serial: gump.serial,
            gump_id,
            button_id,
            switches,
            text_entries,
        })
    }

    pub fn close_gump(&mut self, gump_id: u32) -> Option<ClientAction> {
        self.gumps.close(gump_id).map(|gump| ClientAction::CloseGump {
            serial: gump.serial,
            gump_id,
        })
    }

    pub fn close_all_gumps(&mut self) -> Vec<ClientAction> {
        self.gumps
            .close_all()
            .into_iter()
            .map(|gump| ClientAction::CloseGump {
                serial: gump.serial,
                gump_id: gump.gump_id,
            })
            .collect()
    }

    pub fn respond_prompt(&mut self, task: TaskId, text: &str) -> Result<ClientAction, AnswerError> {
        let request = self.prompt.answer(task).inspect_err(|e| {
            warn!(target: "scripting", "{} could not respond to prompt: {}", task, e);
        })?;
        Ok(ClientAction::PromptResponse {
            serial: request.serial,
            prompt_id: request.prompt_id,
            text: text.to_string(),
        })
    }

    pub fn cancel_prompt(&mut self) -> Option<ClientAction> {
        self.prompt.clear().map(|request| ClientAction::PromptCancel {
            serial: request.serial,
            prompt_id: request.prompt_id,
        })
    }

    /// Pick a menu entry. An unknown entry leaves the menu open and returns None.
    pub fn select_menu(
        &mut self,
        task: TaskId,
        selection: &MenuSelection,
    ) -> Result<Option<ClientAction>, AnswerError> {
        let Some(index) = self.menu.request().and_then(|menu| menu.resolve(selection)) else {
            return Ok(None);
        };
        let menu = self.menu.answer(task).inspect_err(|e| {
            warn!(target: "scripting", "{} could not select menu entry: {}", task, e);
        })?;
        Ok(Some(ClientAction::MenuSelect {
            serial: menu.serial,
            index,
        }))
    }

    pub fn cancel_menu(&mut self) -> Option<ClientAction> {
        self.menu
            .clear()
            .map(|menu| ClientAction::MenuClose { serial: menu.serial })
    }

    /// Every slot currently claimed by `task`
    pub fn claims_of(&self, task: TaskId) -> Vec<SlotRef> {
        let mut claims = Vec::new();
        if self.target.slot.owner() == Some(task) {
            claims.push(SlotRef::Target);
        }
        claims.extend(self.gumps.claimed_by(task).into_iter().map(SlotRef::Gump));
        if self.prompt.owner() == Some(task) {
            claims.push(SlotRef::Prompt);
        }
        if self.menu.owner() == Some(task) {
            claims.push(SlotRef::Menu);
        }
        claims
    }

    /// Hand a claimed request back so another waiter can take it
    pub fn release_claim(&mut self, slot: SlotRef, task: TaskId) -> bool {
        match slot {
            SlotRef::Target => self.target.slot.release(task),
            SlotRef::Gump(gump_id) => self.gumps.release(gump_id, task),
            SlotRef::Prompt => self.prompt.release(task),
            SlotRef::Menu => self.menu.release(task),
        }
    }

    /// Withdraw a claimed request entirely, telling the host
    pub fn discard_claim(&mut self, slot: SlotRef, task: TaskId) -> Option<ClientAction> {
        match slot {
            SlotRef::Target if self.target.slot.owner() == Some(task) => self.cancel_target(),
            SlotRef::Gump(gump_id) if self.gumps.claimed_by(task).contains(&gump_id) => {
                self.close_gump(gump_id)
            }
            SlotRef::Prompt if self.prompt.owner() == Some(task) => self.cancel_prompt(),
            SlotRef::Menu if self.menu.owner() == Some(task) => self.cancel_menu(),
            _ => None,
        }
    }

    /// The player's world position, if the player is known
    pub fn player_position(&self) -> Option<Position> {
        self.world.player_position()
    }

    /// Session teardown
    pub fn clear(&mut self) {
        self.aliases.clear();
        self.target.clear_queue();
        self.search_cursor = None;
        self.last_object = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::gumps::Gump;
    use crate::client::target::CursorKind;
    use crate::client::types::MessageType;
    use crate::client::world::{Entity, Item, Mobile};

    fn state() -> GameState {
        let mut state = GameState::new(&EngineConfig::default());
        let mut player = Mobile::default();
        player.equip(Layer::Backpack, 0x4000_0001);
        state.apply(HostEvent::EntityUpserted {
            entity: Entity::mobile(1, 0x190, Position::new(10, 10, 0), player),
        });
        state.apply(HostEvent::PlayerAssigned { serial: 1 });
        state.apply(HostEvent::EntityUpserted {
            entity: Entity::item(0x4000_0001, 0x0E75, Position::default(), Item {
                container: Some(1),
                layer: Layer::Backpack,
                ..Item::default()
            }),
        });
        state
    }

    fn open_cursor(state: &mut GameState, cursor_id: u32) -> Vec<ClientAction> {
        state.apply(HostEvent::TargetCursorOpened {
            cursor_id,
            kind: CursorKind::Neutral,
        })
    }

    #[test]
    fn test_builtin_aliases() {
        let mut state = state();
        assert_eq!(state.find_alias("self"), Some(1));
        assert_eq!(state.find_alias("ME"), Some(1));
        assert_eq!(state.find_alias("backpack"), Some(0x4000_0001));
        assert_eq!(state.find_alias("mount"), None);
        assert_eq!(state.find_alias("lasttarget"), None);

        state.aliases.set("backpack", 0x4000_0099);
        assert_eq!(state.find_alias("backpack"), Some(0x4000_0099));
    }

    #[test]
    fn test_queued_target_applies_on_cursor_arrival() {
        let mut state = state();
        assert_eq!(state.target_or_queue(TaskId(1), TargetChoice::Object(0x55)), None);
        assert_eq!(state.target.queued(), 1);

        let actions = open_cursor(&mut state, 3);
        assert_eq!(actions, vec![ClientAction::TargetObject { cursor_id: 3, serial: 0x55 }]);
        assert!(!state.target.has_target());
        assert_eq!(state.find_alias("last"), Some(0x55));
    }

    #[test]
    fn test_cancel_target_only_when_outstanding() {
        let mut state = state();
        assert_eq!(state.cancel_target(), None);

        open_cursor(&mut state, 9);
        assert_eq!(state.cancel_target(), Some(ClientAction::CancelTarget { cursor_id: 9 }));
        assert!(state.target.slot.is_idle());
    }

    #[test]
    fn test_answer_target_records_last_target() {
        let mut state = state();
        open_cursor(&mut state, 2);
        let action = state.answer_target(TaskId(1), TargetChoice::Player);
        assert_eq!(action, Ok(ClientAction::TargetSelf { cursor_id: 2 }));

        let last = state.target.last().unwrap();
        assert_eq!(last.serial, 1);
        assert_eq!(last.graphic, 0x190);
        assert_eq!(last.position, Position::new(10, 10, 0));
    }

    #[test]
    fn test_claimed_target_conflict() {
        let mut state = state();
        open_cursor(&mut state, 2);
        assert!(state.target.slot.claim(TaskId(1)));
        assert_eq!(
            state.answer_target(TaskId(2), TargetChoice::Player),
            Err(AnswerError::ClaimedBy(TaskId(1)))
        );
        assert_eq!(state.claims_of(TaskId(1)), vec![SlotRef::Target]);
    }

    #[test]
    fn test_menu_selection() {
        let mut state = state();
        state.apply(HostEvent::MenuShown {
            menu: MenuRequest {
                serial: 0x200,
                options: vec![crate::client::popup_menu::MenuOption {
                    index: 3,
                    text: "Train".to_string(),
                }],
            },
        });

        assert_eq!(state.select_menu(TaskId(1), &"nope".into()), Ok(None));
        assert!(!state.menu.is_idle());
        assert_eq!(
            state.select_menu(TaskId(1), &"train".into()),
            Ok(Some(ClientAction::MenuSelect { serial: 0x200, index: 3 }))
        );
        assert!(state.menu.is_idle());
    }

    #[test]
    fn test_discard_gump_claim_closes_it() {
        let mut state = state();
        state.apply(HostEvent::GumpShown {
            gump: Gump::new(0x300, 77),
        });
        state.gumps.claim(Some(77), TaskId(4));

        assert_eq!(state.discard_claim(SlotRef::Gump(77), TaskId(5)), None);
        assert_eq!(
            state.discard_claim(SlotRef::Gump(77), TaskId(4)),
            Some(ClientAction::CloseGump { serial: 0x300, gump_id: 77 })
        );
        assert!(state.gumps.is_empty());
    }

    #[test]
    fn test_journal_event() {
        let mut state = state();
        state.apply(HostEvent::JournalAppended {
            text: "Welcome".to_string(),
            author: "System".to_string(),
            message_type: MessageType::System,
            hue: 0,
        });
        assert_eq!(state.journal.len(), 1);
    }
}
