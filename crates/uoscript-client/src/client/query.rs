use super::ignore_list::IgnoreList;
use super::types::{Direction, Position, SearchEntityOptions, SearchEntityRange, Serial};
use super::world::{Entity, World};

/// Item search criteria for `find_type` / `find_type_ex`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeQuery {
    pub graphic: u16,
    pub hue: Option<u16>,
    /// Only direct children of this container
    pub container: Option<Serial>,
    /// Tile distance from the player
    pub range: Option<u32>,
}

impl TypeQuery {
    pub fn new(graphic: u16) -> Self {
        Self {
            graphic,
            hue: None,
            container: None,
            range: None,
        }
    }

    pub fn hue(mut self, hue: Option<u16>) -> Self {
        self.hue = hue;
        self
    }

    pub fn container(mut self, container: Option<Serial>) -> Self {
        self.container = container;
        self
    }

    pub fn range(mut self, range: Option<u32>) -> Self {
        self.range = range;
        self
    }
}

/// Filter and ordering for mobile / entity searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub ordering: SearchEntityRange,
    pub hue: Option<u16>,
    pub range: Option<u32>,
    /// Last match returned, for Next/Previous walks
    pub cursor: Option<Serial>,
}

/// Read-only queries over the world, honouring the ignore list
pub struct EntityQuery<'a> {
    world: &'a World,
    ignore_list: &'a IgnoreList,
}

impl<'a> EntityQuery<'a> {
    pub fn new(world: &'a World, ignore_list: &'a IgnoreList) -> Self {
        Self { world, ignore_list }
    }

    pub fn find_object(&self, serial: Serial) -> Option<&'a Entity> {
        self.world.get(serial)
    }

    /// Tile distance between two entities, following item holders
    pub fn distance(&self, a: Serial, b: Serial) -> Option<u32> {
        let from = self.world.world_position(a)?;
        let to = self.world.world_position(b)?;
        Some(from.distance_to(&to))
    }

    /// Direction from `from` towards `to`
    pub fn direction(&self, to: Serial, from: Serial) -> Option<Direction> {
        let target = self.world.world_position(to)?;
        let origin = self.world.world_position(from)?;
        Some(origin.direction_to(&target))
    }

    fn within_range(&self, position: Option<Position>, range: Option<u32>) -> bool {
        let Some(range) = range else {
            return true;
        };
        match (self.world.player_position(), position) {
            (Some(player), Some(position)) => player.distance_to(&position) <= range,
            _ => false,
        }
    }

    fn type_matches(&self, entity: &Entity, query: &TypeQuery) -> bool {
        let Some(item) = entity.as_item() else {
            return false;
        };
        if entity.graphic != query.graphic || query.hue.is_some_and(|hue| hue != entity.hue) {
            return false;
        }
        if query.container.is_some() && item.container != query.container {
            return false;
        }
        self.within_range(self.world.world_position(entity.serial), query.range)
    }

    /// Every matching item, in creation order
    pub fn find_type_ex(&self, query: &TypeQuery) -> Vec<&'a Entity> {
        match query.container {
            Some(container) => {
                let mut found: Vec<&Entity> = self
                    .world
                    .contents(container)
                    .into_iter()
                    .filter(|entity| self.type_matches(entity, query))
                    .collect();
                found.sort_by_key(|entity| self.creation_rank(entity.serial));
                found
            }
            None => self
                .world
                .iter()
                .filter(|entity| self.type_matches(entity, query))
                .collect(),
        }
    }

    fn creation_rank(&self, serial: Serial) -> usize {
        self.world
            .iter()
            .position(|entity| entity.serial == serial)
            .unwrap_or(usize::MAX)
    }

    /// Matching item with the lowest serial
    pub fn find_type(&self, query: &TypeQuery) -> Option<&'a Entity> {
        self.find_type_ex(query)
            .into_iter()
            .min_by_key(|entity| entity.serial)
    }

    fn is_candidate(&self, entity: &Entity, query: &SearchQuery) -> bool {
        if self.world.player_serial() == Some(entity.serial) || self.ignore_list.contains(entity.serial) {
            return false;
        }
        if query.hue.is_some_and(|hue| hue != entity.hue) {
            return false;
        }
        self.within_range(self.world.world_position(entity.serial), query.range)
    }

    /// Mobiles whose notoriety passes `options`
    pub fn search_entity(&self, options: SearchEntityOptions, query: &SearchQuery) -> Option<&'a Entity> {
        let candidates = self
            .world
            .iter()
            .filter(|entity| {
                entity
                    .as_mobile()
                    .is_some_and(|mobile| options.accepts(mobile.notoriety))
            })
            .filter(|entity| self.is_candidate(entity, query))
            .collect();
        self.pick(candidates, query)
    }

    /// Mobiles and ground items with the given graphic
    pub fn search_entity_by_type(&self, graphic: u16, query: &SearchQuery) -> Option<&'a Entity> {
        let candidates = self
            .world
            .iter()
            .filter(|entity| entity.graphic == graphic)
            .filter(|entity| entity.is_mobile() || entity.container().is_none())
            .filter(|entity| self.is_candidate(entity, query))
            .collect();
        self.pick(candidates, query)
    }

    fn pick(&self, mut candidates: Vec<&'a Entity>, query: &SearchQuery) -> Option<&'a Entity> {
        candidates.sort_by_key(|entity| entity.serial);
        let origin = self.world.player_position().unwrap_or_default();

        match query.ordering {
            SearchEntityRange::Next => {
                let after = query
                    .cursor
                    .and_then(|cursor| candidates.iter().find(|entity| entity.serial > cursor));
                after.or(candidates.first()).copied()
            }
            SearchEntityRange::Previous => {
                let before = query
                    .cursor
                    .and_then(|cursor| candidates.iter().rev().find(|entity| entity.serial < cursor));
                before.or(candidates.last()).copied()
            }
            // Candidates are already in serial order, so min_by keeps the lowest serial on ties
            SearchEntityRange::Nearest => candidates
                .into_iter()
                .min_by_key(|entity| origin.distance_to(&entity.position)),
            SearchEntityRange::Closest => candidates.into_iter().min_by(|a, b| {
                origin
                    .euclidean_distance_to(&a.position)
                    .total_cmp(&origin.euclidean_distance_to(&b.position))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{Layer, Notoriety};
    use crate::client::world::{Item, Mobile};

    const PLAYER: Serial = 1;
    const BACKPACK: Serial = 0x4000_0001;

    fn mobile(serial: Serial, x: i32, y: i32, notoriety: Notoriety) -> Entity {
        Entity::mobile(
            serial,
            0x190,
            Position::new(x, y, 0),
            Mobile {
                notoriety,
                ..Mobile::default()
            },
        )
    }

    fn item(serial: Serial, graphic: u16, container: Option<Serial>) -> Entity {
        Entity::item(
            serial,
            graphic,
            Position::new(0, 0, 0),
            Item {
                amount: 1,
                container,
                layer: Layer::Invalid,
                properties: Vec::new(),
            },
        )
    }

    fn world() -> World {
        let mut world = World::new();
        let mut player = Mobile::default();
        player.equip(Layer::Backpack, BACKPACK);
        world.upsert(Entity::mobile(PLAYER, 0x190, Position::new(100, 100, 0), player));
        world.set_player(PLAYER);
        world.upsert(item(BACKPACK, 0x0E75, Some(PLAYER)));
        world
    }

    fn search(ordering: SearchEntityRange, cursor: Option<Serial>) -> SearchQuery {
        SearchQuery {
            ordering,
            hue: None,
            range: None,
            cursor,
        }
    }

    #[test]
    fn test_find_type_with_container_is_direct_children_only() {
        let mut world = world();
        world.upsert(item(0x4000_0002, 0x0E21, Some(BACKPACK)));
        world.upsert(item(0x4000_0003, 0x0E76, Some(BACKPACK)));
        world.upsert(item(0x4000_0004, 0x0E21, Some(0x4000_0003)));
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        let found = query.find_type_ex(&TypeQuery::new(0x0E21).container(Some(BACKPACK)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].serial, 0x4000_0002);

        let everywhere = query.find_type_ex(&TypeQuery::new(0x0E21));
        assert_eq!(everywhere.len(), 2);
    }

    #[test]
    fn test_find_type_ties_by_ascending_serial() {
        let mut world = world();
        world.upsert(item(0x4000_0009, 0x0F7A, Some(BACKPACK)));
        world.upsert(item(0x4000_0005, 0x0F7A, Some(BACKPACK)));
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        let first = query.find_type(&TypeQuery::new(0x0F7A));
        assert_eq!(first.map(|e| e.serial), Some(0x4000_0005));

        // find_type_ex keeps creation order
        let all: Vec<Serial> = query
            .find_type_ex(&TypeQuery::new(0x0F7A))
            .iter()
            .map(|e| e.serial)
            .collect();
        assert_eq!(all, vec![0x4000_0009, 0x4000_0005]);
    }

    #[test]
    fn test_find_type_range_uses_holder_position() {
        let mut world = world();
        world.upsert(item(0x4000_0002, 0x0E21, Some(BACKPACK)));
        let mut far = item(0x4000_0003, 0x0E21, None);
        far.position = Position::new(200, 200, 0);
        world.upsert(far);
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        let near: Vec<Serial> = query
            .find_type_ex(&TypeQuery::new(0x0E21).range(Some(2)))
            .iter()
            .map(|e| e.serial)
            .collect();
        assert_eq!(near, vec![0x4000_0002]);
    }

    #[test]
    fn test_nearest_excludes_ignored_and_player() {
        let mut world = world();
        world.upsert(mobile(10, 101, 100, Notoriety::Enemy));
        world.upsert(mobile(11, 105, 100, Notoriety::Enemy));
        world.upsert(mobile(12, 102, 100, Notoriety::Innocent));
        let mut ignore = IgnoreList::new();

        let query = EntityQuery::new(&world, &ignore);
        let found = query.search_entity(SearchEntityOptions::ENEMY, &search(SearchEntityRange::Nearest, None));
        assert_eq!(found.map(|e| e.serial), Some(10));

        ignore.add(10);
        let query = EntityQuery::new(&world, &ignore);
        let found = query.search_entity(SearchEntityOptions::ENEMY, &search(SearchEntityRange::Nearest, None));
        assert_eq!(found.map(|e| e.serial), Some(11));

        let any = query.search_entity(SearchEntityOptions::ANY, &search(SearchEntityRange::Nearest, None));
        assert_eq!(any.map(|e| e.serial), Some(12));
    }

    #[test]
    fn test_nearest_and_closest_differ() {
        let mut world = world();
        // Tile distance 3 both, euclidean 3.0 vs 4.24
        world.upsert(mobile(20, 103, 103, Notoriety::Gray));
        world.upsert(mobile(21, 103, 100, Notoriety::Gray));
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        let nearest = query.search_entity(SearchEntityOptions::GRAY, &search(SearchEntityRange::Nearest, None));
        assert_eq!(nearest.map(|e| e.serial), Some(20));
        let closest = query.search_entity(SearchEntityOptions::GRAY, &search(SearchEntityRange::Closest, None));
        assert_eq!(closest.map(|e| e.serial), Some(21));
    }

    #[test]
    fn test_next_and_previous_cycle() {
        let mut world = world();
        for serial in [30, 31, 32] {
            world.upsert(mobile(serial, 100, 101, Notoriety::Criminal));
        }
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);
        let options = SearchEntityOptions::CRIMINAL;

        let next = |cursor| {
            query
                .search_entity(options, &search(SearchEntityRange::Next, cursor))
                .map(|e| e.serial)
        };
        assert_eq!(next(None), Some(30));
        assert_eq!(next(Some(30)), Some(31));
        assert_eq!(next(Some(32)), Some(30));

        let previous = query
            .search_entity(options, &search(SearchEntityRange::Previous, Some(30)))
            .map(|e| e.serial);
        assert_eq!(previous, Some(32));
    }

    #[test]
    fn test_search_by_type_skips_contained_items() {
        let mut world = world();
        world.upsert(item(0x4000_0002, 0x1BDD, Some(BACKPACK)));
        world.upsert(item(0x4000_0003, 0x1BDD, None));
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        let found = query.search_entity_by_type(0x1BDD, &search(SearchEntityRange::Next, None));
        assert_eq!(found.map(|e| e.serial), Some(0x4000_0003));
    }

    #[test]
    fn test_distance_and_direction() {
        let mut world = world();
        world.upsert(mobile(40, 100, 95, Notoriety::Innocent));
        let ignore = IgnoreList::new();
        let query = EntityQuery::new(&world, &ignore);

        assert_eq!(query.distance(40, PLAYER), Some(5));
        assert_eq!(query.distance(BACKPACK, PLAYER), Some(0));
        assert_eq!(query.direction(40, PLAYER), Some(Direction::North));
        assert_eq!(query.distance(999, PLAYER), None);
    }
}
