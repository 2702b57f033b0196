use crate::context::ScriptApi;
use uoscript_client::client::query::{SearchQuery, TypeQuery};
use uoscript_client::client::types::{Direction, SearchEntityOptions, SearchEntityRange, Skill};
use uoscript_client::client::world::{Entity, Mobile, MobileFlags};
use uoscript_client::client::{ClientAction, GameState, Serial};

pub struct ClientApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> ClientApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    // ===== Search =====

    pub fn find_object(&self, serial: Serial) -> Option<Entity> {
        self.api.read(|state| state.query().find_object(serial).cloned())
    }

    fn type_query(
        state: &GameState,
        graphic: u16,
        hue: Option<u16>,
        container: Option<Serial>,
        range: Option<u32>,
    ) -> TypeQuery {
        let query = TypeQuery::new(graphic).hue(hue).container(container);
        // The session default only applies to world searches
        match container {
            Some(_) => query.range(range),
            None => query.range(state.effective_range(range)),
        }
    }

    pub fn find_type(
        &self,
        graphic: u16,
        hue: Option<u16>,
        container: Option<Serial>,
        range: Option<u32>,
    ) -> Option<Entity> {
        self.api.read(|state| {
            let query = Self::type_query(state, graphic, hue, container, range);
            state.query().find_type(&query).cloned()
        })
    }

    pub fn find_type_ex(
        &self,
        graphic: u16,
        hue: Option<u16>,
        container: Option<Serial>,
        range: Option<u32>,
    ) -> Vec<Entity> {
        self.api.read(|state| {
            let query = Self::type_query(state, graphic, hue, container, range);
            state
                .query()
                .find_type_ex(&query)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn find_alias(&self, alias: &str) -> Option<Serial> {
        self.api.read(|state| state.find_alias(alias))
    }

    pub fn set_alias(&self, alias: &str, serial: Serial) {
        self.api.write(|state| state.aliases.set(alias, serial));
    }

    pub fn unset_alias(&self, alias: &str) {
        self.api.write(|state| {
            state.aliases.unset(alias);
        });
    }

    pub fn promote_alias(&self, alias: &str) -> bool {
        self.api.write(|state| state.aliases.promote(alias))
    }

    /// Default range for searches that omit one
    pub fn set_find_distance(&self, distance: u32) {
        self.api.write(|state| state.find_distance = Some(distance));
    }

    fn search(
        &self,
        f: impl FnOnce(&GameState, &SearchQuery) -> Option<Entity>,
        ordering: SearchEntityRange,
        hue: Option<u16>,
        range: Option<u32>,
    ) -> Option<Entity> {
        self.api.write(|state| {
            let query = SearchQuery {
                ordering,
                hue,
                range: state.effective_range(range),
                cursor: state.search_cursor,
            };
            let found = f(state, &query);
            if let Some(entity) = &found {
                state.search_cursor = Some(entity.serial);
            }
            found
        })
    }

    /// Mobile matching the notoriety filter, excluding the player and ignored serials
    pub fn search_entity(
        &self,
        options: SearchEntityOptions,
        ordering: SearchEntityRange,
        hue: Option<u16>,
        range: Option<u32>,
    ) -> Option<Entity> {
        self.search(
            |state, query| state.query().search_entity(options, query).cloned(),
            ordering,
            hue,
            range,
        )
    }

    pub fn search_entity_by_type(
        &self,
        graphic: u16,
        ordering: SearchEntityRange,
        hue: Option<u16>,
        range: Option<u32>,
    ) -> Option<Entity> {
        self.search(
            |state, query| state.query().search_entity_by_type(graphic, query).cloned(),
            ordering,
            hue,
            range,
        )
    }

    // ===== Interface =====

    pub fn head_msg(&self, message: &str, serial: Serial, hue: Option<u16>) {
        self.api.send(ClientAction::HeadMessage {
            serial,
            text: message.to_string(),
            hue: hue.unwrap_or_default(),
        });
    }

    pub fn sys_msg(&self, message: &str, hue: Option<u16>) {
        self.api.send(ClientAction::SystemMessage {
            text: message.to_string(),
            hue: hue.unwrap_or(0x3B2),
        });
    }

    pub fn client_print(&self, message: &str, hue: Option<u16>) {
        self.api.send(ClientAction::ClientPrint {
            text: message.to_string(),
            hue: hue.unwrap_or_default(),
        });
    }

    pub fn close_client_gumps(&self) {
        self.api.send(ClientAction::CloseClientGumps);
    }

    pub fn close_gump(&self, gump_id: u32) {
        self.api.act(|state| state.close_gump(gump_id));
    }

    pub fn get_skill(&self, name: &str) -> Option<Skill> {
        self.api.read(|state| state.world.skill(name).cloned())
    }

    pub fn get_skills(&self) -> Vec<Skill> {
        self.api.read(|state| state.world.skills().to_vec())
    }

    // ===== Trading =====

    pub fn trade_request(&self, serial: Serial) -> bool {
        let known = self
            .api
            .read(|state| state.world.get(serial).is_some_and(Entity::is_mobile));
        if known {
            self.api.send(ClientAction::TradeRequest { serial });
        }
        known
    }

    pub fn trade_response(&self, accept: bool) {
        self.api.send(ClientAction::TradeResponse { accept });
    }

    // ===== Queries =====

    pub fn is_object_exist(&self, serial: Serial) -> bool {
        self.api.read(|state| state.world.contains(serial))
    }

    /// Tile distance from `b` (the player when None) to `a`
    pub fn get_distance(&self, a: Serial, b: Option<Serial>) -> Option<u32> {
        self.api.read(|state| {
            let b = b.or(state.world.player_serial())?;
            state.query().distance(a, b)
        })
    }

    /// Direction from `b` (the player when None) towards `a`
    pub fn get_dir(&self, a: Serial, b: Option<Serial>) -> Option<Direction> {
        self.api.read(|state| {
            let b = b.or(state.world.player_serial())?;
            state.query().direction(a, b)
        })
    }

    fn player_flag(&self, flag: impl FnOnce(&MobileFlags) -> bool) -> bool {
        self.api.read(|state| {
            state
                .world
                .player_mobile()
                .map(|mobile: &Mobile| flag(&mobile.flags))
                .unwrap_or(false)
        })
    }

    pub fn is_war_mode(&self) -> bool {
        self.player_flag(|flags| flags.war_mode)
    }

    pub fn is_dead(&self) -> bool {
        self.player_flag(|flags| flags.dead)
    }

    pub fn is_hidden(&self) -> bool {
        self.player_flag(|flags| flags.hidden)
    }

    pub fn is_poisoned(&self) -> bool {
        self.player_flag(|flags| flags.poisoned)
    }

    pub fn is_paralyzed(&self) -> bool {
        self.player_flag(|flags| flags.paralyzed)
    }

    pub fn is_yellow_hits(&self) -> bool {
        self.player_flag(|flags| flags.yellow_hits)
    }

    pub fn is_in_ignore_list(&self, serial: Serial) -> bool {
        self.api.read(|state| state.ignore_list.contains(serial))
    }

    pub fn connected(&self) -> bool {
        self.api.read(|state| state.connected)
    }
}
