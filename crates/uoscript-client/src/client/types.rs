use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, FromRepr};

/// Stable identifier of a tracked game entity
pub type Serial = u32;

/// Identifier of a running script task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// World position of an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Tile distance (the larger of the two axis deltas)
    pub fn distance_to(&self, other: &Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Straight-line distance on the ground plane
    pub fn euclidean_distance_to(&self, other: &Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Direction of travel from `self` towards `other`
    pub fn direction_to(&self, other: &Position) -> Direction {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        if dx == 0.0 && dy == 0.0 {
            return Direction::North;
        }
        // 0 degrees points north (negative y), angles grow clockwise
        let degrees = dx.atan2(-dy).to_degrees();
        let sector = ((degrees + 22.5).rem_euclid(360.0) / 45.0) as u8 % 8;
        Direction::from_repr(sector).unwrap_or(Direction::North)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, FromRepr, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Direction {
    #[default]
    North = 0,
    Right = 1,
    East = 2,
    Down = 3,
    South = 4,
    Left = 5,
    West = 6,
    Up = 7,
}

/// Speech/message type, matching the protocol message-type byte
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, FromRepr, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum MessageType {
    #[default]
    Regular = 0,
    System = 1,
    Emote = 2,
    Limit3Spell = 3,
    Label = 6,
    Focus = 7,
    Whisper = 8,
    Yell = 9,
    Spell = 10,
    Guild = 13,
    Alliance = 14,
    Command = 15,
    Encoded = 192,
    UOChat = 254,
    Party = 255,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, FromRepr, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Notoriety {
    #[default]
    Unknown = 0,
    Innocent = 1,
    Ally = 2,
    Gray = 3,
    Criminal = 4,
    Enemy = 5,
    Murderer = 6,
    Invulnerable = 7,
}

bitflags! {
    /// Notoriety filter for entity searches; flags combine with OR
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SearchEntityOptions: u32 {
        const ANY = 1;
        const ENEMY = 2;
        const MURDERER = 4;
        const CRIMINAL = 8;
        const GRAY = 16;
        const INNOCENT = 32;
        const UNFRIENDLY = 64;
        const FRIEND = 128;
        const INVULNERABLE = 256;
    }
}

impl SearchEntityOptions {
    /// Whether a mobile with the given notoriety passes this filter
    pub fn accepts(&self, notoriety: Notoriety) -> bool {
        if self.contains(Self::ANY) {
            return true;
        }
        let matched = match notoriety {
            Notoriety::Enemy => Self::ENEMY | Self::UNFRIENDLY,
            Notoriety::Murderer => Self::MURDERER | Self::UNFRIENDLY,
            Notoriety::Criminal => Self::CRIMINAL | Self::UNFRIENDLY,
            Notoriety::Gray => Self::GRAY | Self::UNFRIENDLY,
            Notoriety::Innocent => Self::INNOCENT,
            Notoriety::Ally => Self::FRIEND,
            Notoriety::Invulnerable => Self::INVULNERABLE,
            Notoriety::Unknown => Self::empty(),
        };
        self.intersects(matched)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum SearchEntityRange {
    Next = 0,
    Previous = 1,
    Nearest = 2,
    Closest = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum SearchEntityType {
    Mobile = 1,
    Item = 2,
    Both = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum Ability {
    None = 0,
    Disarm = 1,
    MortalStrike = 2,
    ArmorIgnore = 3,
    BleedAttack = 4,
    ConcussionBlow = 5,
    CrushingBlow = 6,
    Disarm2 = 7,
    Dismount = 8,
    DoubleStrike = 9,
    InfectiousStrike = 10,
    MortalStrike2 = 11,
    MovingShot = 12,
    ParalyzingBlow = 13,
    ShadowStrike = 14,
    WhirlwindAttack = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum BuffDebuff {
    None = 0,
    Clumsy = 1,
    FeebleMind = 2,
    Weaken = 3,
    Agility = 4,
    Cunning = 5,
    Strength = 6,
    Bless = 7,
    Curse = 8,
    MassDispel = 9,
    Heal = 10,
    GreaterHeal = 11,
    MiniHeal = 12,
    Poison = 13,
    Cure = 14,
    Protection = 15,
    Harm = 16,
    MagicArrow = 17,
    Fireball = 18,
    Lightning = 19,
}

/// Equipment layer of an item worn by a mobile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, FromRepr, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Layer {
    #[default]
    Invalid = 0,
    OneHanded = 1,
    TwoHanded = 2,
    Shoes = 3,
    Pants = 4,
    Shirt = 5,
    Hat = 6,
    Gloves = 7,
    Ring = 8,
    Talisman = 9,
    Necklace = 10,
    Hair = 11,
    Waist = 12,
    InnerTorso = 13,
    Bracelet = 14,
    Face = 15,
    MiddleTorso = 16,
    Earrings = 17,
    Arms = 18,
    Cloak = 19,
    Backpack = 20,
    OuterTorso = 21,
    OuterLegs = 22,
    InnerLegs = 23,
    Mount = 24,
    ShopBuy = 25,
    ShopResale = 26,
    ShopSell = 27,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, Serialize, Deserialize)]
#[repr(u8)]
pub enum SkillName {
    Alchemy = 0,
    Anatomy = 1,
    AnimalLore = 2,
    ItemIdentification = 3,
    ArmsLore = 4,
    Parrying = 5,
    Begging = 6,
    Blacksmithing = 7,
    Fletching = 8,
    Peacemaking = 9,
    Camping = 10,
    Carpentry = 11,
    Cartography = 12,
    Cooking = 13,
    DetectingHidden = 14,
    Discordance = 15,
    EvaluateIntelligence = 16,
    Healing = 17,
    Fishing = 18,
    ForensicEvaluation = 19,
    Herding = 20,
    Hiding = 21,
    Provocation = 22,
    Inscribe = 23,
    Lockpicking = 24,
    Magery = 25,
    MagicResistance = 26,
    Tactics = 27,
    Snooping = 28,
    Musicianship = 29,
    Poisoning = 30,
    Archery = 31,
    SpiritSpeak = 32,
    Stealing = 33,
    Tailoring = 34,
    AnimalTaming = 35,
    TasteIdentification = 36,
    Tinkering = 37,
    Tracking = 38,
    Veterinary = 39,
    Swordsmanship = 40,
    MaceFighting = 41,
    Fencing = 42,
    Wrestling = 43,
    Lumberjacking = 44,
    Mining = 45,
    Meditation = 46,
    Stealth = 47,
    RemoveTrap = 48,
    Necromancy = 49,
    Focus = 50,
    Chivalry = 51,
    Bushido = 52,
    Ninjitsu = 53,
    SpellWeaving = 54,
    Mysticism = 55,
    Imbuing = 56,
    Throwing = 57,
}

/// A skill entry as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub value: f64,
    pub base_value: f64,
    pub cap: f64,
    pub lock: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_numeric_values() {
        assert_eq!(Direction::Up as u8, 7);
        assert_eq!(MessageType::Party as u8, 255);
        assert_eq!(MessageType::from_repr(192), Some(MessageType::Encoded));
        assert_eq!(MessageType::from_repr(4), None);
        assert_eq!(Notoriety::Invulnerable as u8, 7);
        assert_eq!(Layer::ShopSell as u8, 27);
        assert_eq!(SkillName::Throwing as u8, 57);
        assert_eq!(SearchEntityOptions::INVULNERABLE.bits(), 256);
    }

    #[test]
    fn test_search_options_or_together() {
        let options = SearchEntityOptions::MURDERER | SearchEntityOptions::CRIMINAL;
        assert!(options.accepts(Notoriety::Murderer));
        assert!(options.accepts(Notoriety::Criminal));
        assert!(!options.accepts(Notoriety::Innocent));

        assert!(SearchEntityOptions::UNFRIENDLY.accepts(Notoriety::Gray));
        assert!(SearchEntityOptions::FRIEND.accepts(Notoriety::Ally));
        assert!(SearchEntityOptions::ANY.accepts(Notoriety::Unknown));
    }

    #[test]
    fn test_direction_to() {
        let origin = Position::new(100, 100, 0);
        assert_eq!(origin.direction_to(&Position::new(100, 90, 0)), Direction::North);
        assert_eq!(origin.direction_to(&Position::new(110, 90, 0)), Direction::Right);
        assert_eq!(origin.direction_to(&Position::new(110, 100, 0)), Direction::East);
        assert_eq!(origin.direction_to(&Position::new(110, 110, 0)), Direction::Down);
        assert_eq!(origin.direction_to(&Position::new(100, 110, 0)), Direction::South);
        assert_eq!(origin.direction_to(&Position::new(90, 110, 0)), Direction::Left);
        assert_eq!(origin.direction_to(&Position::new(90, 100, 0)), Direction::West);
        assert_eq!(origin.direction_to(&Position::new(90, 90, 0)), Direction::Up);
    }

    #[test]
    fn test_distances() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 4, 10);
        assert_eq!(a.distance_to(&b), 4);
        assert_eq!(a.euclidean_distance_to(&b), 5.0);
    }
}
