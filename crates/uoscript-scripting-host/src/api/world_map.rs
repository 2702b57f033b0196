use crate::context::ScriptApi;
use uoscript_client::client::ClientAction;

pub struct WorldMapApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> WorldMapApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    pub fn open(&self) {
        self.api.act(|state| {
            state.world_map.open();
            Some(ClientAction::WorldMapOpen)
        });
    }

    pub fn close(&self) {
        self.api.act(|state| {
            state.world_map.close();
            Some(ClientAction::WorldMapClose)
        });
    }

    pub fn is_open(&self) -> bool {
        self.api.read(|state| state.world_map.is_open())
    }

    pub fn add_pin(&self, x: i32, y: i32, name: &str) {
        self.api.act(|state| {
            state.world_map.add_pin(x, y, name);
            Some(ClientAction::WorldMapAddPin {
                x,
                y,
                name: name.to_string(),
            })
        });
    }

    pub fn remove_pin(&self, x: i32, y: i32) {
        self.api.act(|state| {
            state
                .world_map
                .remove_pin(x, y)
                .then_some(ClientAction::WorldMapRemovePin { x, y })
        });
    }

    pub fn clear_pins(&self) {
        self.api.act(|state| {
            state.world_map.clear_pins();
            Some(ClientAction::WorldMapClearPins)
        });
    }
}
