use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Direction, Layer, Notoriety, Position, Serial, Skill};

/// Longest container chain followed when resolving an item's world position
const MAX_CONTAINER_DEPTH: usize = 32;

/// Status flags of a mobile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileFlags {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub war_mode: bool,
    #[serde(default)]
    pub poisoned: bool,
    #[serde(default)]
    pub paralyzed: bool,
    #[serde(default)]
    pub yellow_hits: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mobile {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub hits: u16,
    #[serde(default)]
    pub max_hits: u16,
    #[serde(default)]
    pub mana: u16,
    #[serde(default)]
    pub max_mana: u16,
    #[serde(default)]
    pub stamina: u16,
    #[serde(default)]
    pub max_stamina: u16,
    #[serde(default)]
    pub notoriety: Notoriety,
    #[serde(default)]
    pub flags: MobileFlags,
    /// Equipped items, as serials owned by the world
    #[serde(default)]
    pub equipment: Vec<Equipped>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub layer: Layer,
    pub serial: Serial,
}

impl Mobile {
    pub fn equipped(&self, layer: Layer) -> Option<Serial> {
        self.equipment
            .iter()
            .find(|slot| slot.layer == layer)
            .map(|slot| slot.serial)
    }

    /// Record an item on a layer, replacing whatever was there
    pub fn equip(&mut self, layer: Layer, serial: Serial) {
        self.equipment.retain(|slot| slot.layer != layer);
        self.equipment.push(Equipped { layer, serial });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default = "default_amount")]
    pub amount: u16,
    /// Holder of this item (container item or mobile), if any
    #[serde(default)]
    pub container: Option<Serial>,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub properties: Vec<String>,
}

fn default_amount() -> u16 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EntityKind {
    Mobile(Mobile),
    Item(Item),
}

/// A tracked game entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub serial: Serial,
    #[serde(default)]
    pub graphic: u16,
    #[serde(default)]
    pub hue: u16,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: EntityKind,
}

impl Entity {
    pub fn mobile(serial: Serial, graphic: u16, position: Position, mobile: Mobile) -> Self {
        Self {
            serial,
            graphic,
            hue: 0,
            position,
            name: String::new(),
            kind: EntityKind::Mobile(mobile),
        }
    }

    pub fn item(serial: Serial, graphic: u16, position: Position, item: Item) -> Self {
        Self {
            serial,
            graphic,
            hue: 0,
            position,
            name: String::new(),
            kind: EntityKind::Item(item),
        }
    }

    pub fn with_hue(mut self, hue: u16) -> Self {
        self.hue = hue;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn as_mobile(&self) -> Option<&Mobile> {
        match &self.kind {
            EntityKind::Mobile(mobile) => Some(mobile),
            EntityKind::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.kind {
            EntityKind::Item(item) => Some(item),
            EntityKind::Mobile(_) => None,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self.kind, EntityKind::Mobile(_))
    }

    pub fn container(&self) -> Option<Serial> {
        self.as_item().and_then(|item| item.container)
    }
}

/// Player-only stat block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub str: u16,
    pub dex: u16,
    pub int: u16,
    pub weight: u16,
    pub max_weight: u16,
    pub gold: u32,
    pub followers: u8,
    pub followers_max: u8,
    pub fire_resist: i16,
    pub cold_resist: i16,
    pub poison_resist: i16,
    pub energy_resist: i16,
    pub luck: i16,
    pub min_damage: u16,
    pub max_damage: u16,
    pub tithing: u32,
    pub attack_chance: i16,
    pub defense_chance: i16,
    pub lower_mana_cost: i16,
    pub lower_reagent_cost: i16,
    pub spell_damage_increase: i16,
    pub faster_cast_recovery: i16,
    pub faster_casting: i16,
    pub hit_chance_increase: i16,
    pub swing_speed_increase: i16,
    pub damage_increase: i16,
    pub magic_resist: i16,
    pub pet_serial: Serial,
}

struct Tracked {
    entity: Entity,
    /// Order of first observation
    created: u64,
}

/// Authoritative set of entities, mutated only by host events
#[derive(Default)]
pub struct World {
    entities: HashMap<Serial, Tracked>,
    /// Container -> direct children, in arrival order
    container_contents: HashMap<Serial, Vec<Serial>>,
    player_serial: Option<Serial>,
    player_stats: PlayerStats,
    skills: Vec<Skill>,
    next_created: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly observed entity or replace the tracked state of a known one
    pub fn upsert(&mut self, entity: Entity) {
        let serial = entity.serial;
        let new_container = entity.container();

        let existing = self
            .entities
            .get(&serial)
            .map(|tracked| (tracked.entity.container(), tracked.created));

        let created = match existing {
            Some((old_container, created)) => {
                if old_container != new_container {
                    self.detach(serial, old_container);
                    self.attach(serial, new_container);
                }
                created
            }
            None => {
                self.attach(serial, new_container);
                let created = self.next_created;
                self.next_created += 1;
                created
            }
        };

        self.entities.insert(serial, Tracked { entity, created });
    }

    /// Evict an entity. Its children stay tracked until the host removes them.
    pub fn remove(&mut self, serial: Serial) -> Option<Entity> {
        let tracked = self.entities.remove(&serial)?;
        self.detach(serial, tracked.entity.container());
        self.container_contents.remove(&serial);
        if self.player_serial == Some(serial) {
            self.player_serial = None;
        }
        Some(tracked.entity)
    }

    /// Move an item to a new holder
    pub fn move_item(&mut self, serial: Serial, container: Option<Serial>) {
        let Some(tracked) = self.entities.get_mut(&serial) else {
            return;
        };
        let EntityKind::Item(item) = &mut tracked.entity.kind else {
            return;
        };
        let old = item.container;
        item.container = container;
        self.detach(serial, old);
        self.attach(serial, container);
    }

    fn attach(&mut self, serial: Serial, container: Option<Serial>) {
        if let Some(cid) = container {
            self.container_contents.entry(cid).or_default().push(serial);
        }
    }

    fn detach(&mut self, serial: Serial, container: Option<Serial>) {
        if let Some(cid) = container
            && let Some(contents) = self.container_contents.get_mut(&cid)
        {
            contents.retain(|&id| id != serial);
        }
    }

    pub fn get(&self, serial: Serial) -> Option<&Entity> {
        self.entities.get(&serial).map(|tracked| &tracked.entity)
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.entities.contains_key(&serial)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        let mut tracked: Vec<&Tracked> = self.entities.values().collect();
        tracked.sort_by_key(|t| t.created);
        tracked.into_iter().map(|t| &t.entity)
    }

    /// Direct children of a container, in arrival order
    pub fn contents(&self, container: Serial) -> Vec<&Entity> {
        self.container_contents
            .get(&container)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    /// Position of an entity in the world, following its holders outwards
    pub fn world_position(&self, serial: Serial) -> Option<Position> {
        let mut current = self.get(serial)?;
        for _ in 0..MAX_CONTAINER_DEPTH {
            match current.container() {
                Some(holder) => match self.get(holder) {
                    Some(entity) => current = entity,
                    None => return None,
                },
                None => return Some(current.position),
            }
        }
        None
    }

    pub fn set_player(&mut self, serial: Serial) {
        self.player_serial = Some(serial);
    }

    pub fn player_serial(&self) -> Option<Serial> {
        self.player_serial
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player_serial.and_then(|serial| self.get(serial))
    }

    pub fn player_mobile(&self) -> Option<&Mobile> {
        self.player().and_then(Entity::as_mobile)
    }

    pub fn player_position(&self) -> Option<Position> {
        self.player().map(|player| player.position)
    }

    /// Serial of the item the player wears on the given layer
    pub fn player_layer(&self, layer: Layer) -> Option<Serial> {
        self.player_mobile().and_then(|mobile| mobile.equipped(layer))
    }

    pub fn player_stats(&self) -> &PlayerStats {
        &self.player_stats
    }

    pub fn set_player_stats(&mut self, stats: PlayerStats) {
        self.player_stats = stats;
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn set_skills(&mut self, skills: Vec<Skill>) {
        self.skills = skills;
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills
            .iter()
            .find(|skill| skill.name.eq_ignore_ascii_case(name))
    }

    /// Drop everything (session teardown)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.container_contents.clear();
        self.player_serial = None;
        self.player_stats = PlayerStats::default();
        self.skills.clear();
    }
}
