use serde::{Deserialize, Serialize};

use super::gumps::{Gump, GumpTextEntry};
use super::popup_menu::MenuRequest;
use super::target::CursorKind;
use super::types::{Direction, Layer, MessageType, Position, Serial, Skill};
use super::world::{Entity, PlayerStats};

/// State changes decoded by the host and applied to the session before a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    EntityUpserted {
        entity: Entity,
    },
    EntityRemoved {
        serial: Serial,
    },
    ItemMoved {
        serial: Serial,
        #[serde(default)]
        container: Option<Serial>,
    },
    PlayerAssigned {
        serial: Serial,
    },
    PlayerStatsUpdated {
        stats: PlayerStats,
    },
    SkillsUpdated {
        skills: Vec<Skill>,
    },
    ConnectionChanged {
        connected: bool,
    },
    JournalAppended {
        text: String,
        #[serde(default)]
        author: String,
        #[serde(default)]
        message_type: MessageType,
        #[serde(default)]
        hue: u16,
    },
    TargetCursorOpened {
        cursor_id: u32,
        #[serde(default)]
        kind: CursorKind,
    },
    TargetCursorClosed,
    GumpShown {
        gump: Gump,
    },
    GumpClosed {
        gump_id: u32,
    },
    PromptOpened {
        serial: Serial,
        prompt_id: u32,
    },
    PromptClosed,
    MenuShown {
        menu: MenuRequest,
    },
    MenuClosed,
}

/// Commands the engine asks the host to perform
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    TargetObject {
        cursor_id: u32,
        serial: Serial,
    },
    TargetSelf {
        cursor_id: u32,
    },
    TargetLocation {
        cursor_id: u32,
        graphic: u16,
        position: Position,
    },
    CancelTarget {
        cursor_id: u32,
    },
    GumpReply {
        serial: Serial,
        gump_id: u32,
        button_id: u32,
        switches: Vec<u32>,
        text_entries: Vec<GumpTextEntry>,
    },
    CloseGump {
        serial: Serial,
        gump_id: u32,
    },
    GumpAction {
        gump_id: u32,
        element_id: u32,
        action: String,
    },
    CloseClientGumps,
    PromptResponse {
        serial: Serial,
        prompt_id: u32,
        text: String,
    },
    PromptCancel {
        serial: Serial,
        prompt_id: u32,
    },
    MenuSelect {
        serial: Serial,
        index: u16,
    },
    MenuClose {
        serial: Serial,
    },
    Speech {
        text: String,
        message_type: MessageType,
        hue: u16,
    },
    SystemMessage {
        text: String,
        hue: u16,
    },
    HeadMessage {
        serial: Serial,
        text: String,
        hue: u16,
    },
    ClientPrint {
        text: String,
        hue: u16,
    },
    MoveItem {
        serial: Serial,
        amount: u16,
        destination: Serial,
        x: Option<i32>,
        y: Option<i32>,
    },
    MoveItemToGround {
        serial: Serial,
        amount: u16,
        position: Position,
    },
    Equip {
        serial: Serial,
        layer: Layer,
    },
    Unequip {
        layer: Layer,
    },
    UseObject {
        serial: Serial,
    },
    Attack {
        serial: Serial,
    },
    Cast {
        spell: String,
    },
    Walk {
        direction: Direction,
        run: bool,
    },
    WarMode {
        enabled: bool,
    },
    OpenDoor,
    Emote {
        name: &'static str,
    },
    TradeRequest {
        serial: Serial,
    },
    TradeResponse {
        accept: bool,
    },
    WorldMapOpen,
    WorldMapClose,
    WorldMapAddPin {
        x: i32,
        y: i32,
        name: String,
    },
    WorldMapRemovePin {
        x: i32,
        y: i32,
    },
    WorldMapClearPins,
}
