use tracing::debug;

use crate::context::ScriptApi;
use uoscript_client::client::query::TypeQuery;
use uoscript_client::client::target::TargetChoice;
use uoscript_client::client::types::{Direction, Layer, MessageType};
use uoscript_client::client::world::{Entity, PlayerStats};
use uoscript_client::client::{ClientAction, GameState, Position, Serial};

/// Actions performed as the player. Every call returns false, sending nothing,
/// when an object it names (or the player itself) is unknown.
pub struct PlayerApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> PlayerApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    pub fn serial(&self) -> Option<Serial> {
        self.api.read(|state| state.world.player_serial())
    }

    pub fn entity(&self) -> Option<Entity> {
        self.api.read(|state| state.world.player().cloned())
    }

    pub fn stats(&self) -> PlayerStats {
        self.api.read(|state| state.world.player_stats().clone())
    }

    pub fn position(&self) -> Option<Position> {
        self.api.read(|state| state.player_position())
    }

    /// Send the action built from the current state, if any
    fn perform(&self, f: impl FnOnce(&mut GameState) -> Option<ClientAction>) -> bool {
        match self.api.write(f) {
            Some(action) => {
                self.api.send(action);
                true
            }
            None => {
                debug!(target: "scripting", "{} skipped an action on a missing object", self.api.task_id());
                false
            }
        }
    }

    fn as_player(&self, action: ClientAction) -> bool {
        self.perform(|state| state.world.player_serial().map(|_| action))
    }

    // ===== Items =====

    /// Move an item into a container. `amount` defaults to the whole stack.
    pub fn move_item(
        &self,
        item: Serial,
        destination: Serial,
        amount: Option<u16>,
        x: Option<i32>,
        y: Option<i32>,
    ) -> bool {
        self.perform(|state| {
            let stack = state.world.get(item)?.as_item()?.amount;
            if !state.world.contains(destination) {
                return None;
            }
            Some(ClientAction::MoveItem {
                serial: item,
                amount: amount.unwrap_or(stack),
                destination,
                x,
                y,
            })
        })
    }

    pub fn move_item_to_ground(
        &self,
        item: Serial,
        x: i32,
        y: i32,
        z: i32,
        amount: Option<u16>,
    ) -> bool {
        self.perform(|state| {
            let stack = state.world.get(item)?.as_item()?.amount;
            Some(ClientAction::MoveItemToGround {
                serial: item,
                amount: amount.unwrap_or(stack),
                position: Position::new(x, y, z),
            })
        })
    }

    /// Drop the whole stack at a ground location
    pub fn drop_item(&self, item: Serial, x: i32, y: i32, z: i32) -> bool {
        self.move_item_to_ground(item, x, y, z, None)
    }

    pub fn equip(&self, item: Serial) -> bool {
        self.perform(|state| {
            let layer = state.world.get(item)?.as_item()?.layer;
            if layer == Layer::Invalid {
                return None;
            }
            Some(ClientAction::Equip { serial: item, layer })
        })
    }

    pub fn unequip(&self, layer: Layer) -> bool {
        self.perform(|state| {
            state.world.player_layer(layer)?;
            Some(ClientAction::Unequip { layer })
        })
    }

    /// Double-click an object; it becomes `lastobject`
    pub fn use_object(&self, serial: Serial) -> bool {
        self.perform(|state| {
            if !state.world.contains(serial) {
                return None;
            }
            state.last_object = Some(serial);
            Some(ClientAction::UseObject { serial })
        })
    }

    pub fn use_item(&self, serial: Serial) -> bool {
        self.use_object(serial)
    }

    /// Use the first item of this graphic in the backpack
    pub fn use_type(&self, graphic: u16, hue: Option<u16>) -> bool {
        let found = self.api.read(|state| {
            let backpack = state.find_alias("backpack")?;
            let query = TypeQuery::new(graphic).hue(hue).container(Some(backpack));
            state.query().find_type(&query).map(|entity| entity.serial)
        });
        match found {
            Some(serial) => self.use_object(serial),
            None => false,
        }
    }

    // ===== Combat =====

    pub fn attack(&self, serial: Serial) -> bool {
        self.perform(|state| {
            state.world.get(serial).filter(|entity| entity.is_mobile())?;
            Some(ClientAction::Attack { serial })
        })
    }

    /// Cast a spell. A target is queued for the cursor the cast opens.
    pub fn cast(&self, spell: &str, target: Option<Serial>) -> bool {
        self.perform(|state| {
            state.world.player_serial()?;
            if let Some(serial) = target {
                if !state.world.contains(serial) {
                    return None;
                }
                state.target.enqueue(TargetChoice::Object(serial));
            }
            Some(ClientAction::Cast {
                spell: spell.to_string(),
            })
        })
    }

    pub fn war_mode(&self, enabled: bool) -> bool {
        self.as_player(ClientAction::WarMode { enabled })
    }

    // ===== Speech =====

    fn speak(&self, text: &str, message_type: MessageType, hue: Option<u16>) -> bool {
        self.as_player(ClientAction::Speech {
            text: text.to_string(),
            message_type,
            hue: hue.unwrap_or(0x34),
        })
    }

    pub fn say(&self, text: &str, hue: Option<u16>) -> bool {
        self.speak(text, MessageType::Regular, hue)
    }

    pub fn whisper(&self, text: &str, hue: Option<u16>) -> bool {
        self.speak(text, MessageType::Whisper, hue)
    }

    pub fn yell(&self, text: &str, hue: Option<u16>) -> bool {
        self.speak(text, MessageType::Yell, hue)
    }

    // ===== Movement =====

    pub fn walk(&self, direction: Direction) -> bool {
        self.as_player(ClientAction::Walk {
            direction,
            run: false,
        })
    }

    pub fn run(&self, direction: Direction) -> bool {
        self.as_player(ClientAction::Walk {
            direction,
            run: true,
        })
    }

    pub fn open_door(&self) -> bool {
        self.as_player(ClientAction::OpenDoor)
    }

    pub fn bow(&self) -> bool {
        self.as_player(ClientAction::Emote { name: "bow" })
    }

    pub fn salute(&self) -> bool {
        self.as_player(ClientAction::Emote { name: "salute" })
    }
}
