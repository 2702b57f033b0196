use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPin {
    pub x: i32,
    pub y: i32,
    pub name: String,
}

/// Client-side world map window and its pins
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    open: bool,
    pins: Vec<MapPin>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Add a pin, replacing any pin already at the same coordinates
    pub fn add_pin(&mut self, x: i32, y: i32, name: impl Into<String>) {
        self.pins.retain(|pin| pin.x != x || pin.y != y);
        self.pins.push(MapPin {
            x,
            y,
            name: name.into(),
        });
    }

    pub fn remove_pin(&mut self, x: i32, y: i32) -> bool {
        let before = self.pins.len();
        self.pins.retain(|pin| pin.x != x || pin.y != y);
        self.pins.len() != before
    }

    pub fn clear_pins(&mut self) {
        self.pins.clear();
    }

    pub fn pins(&self) -> &[MapPin] {
        &self.pins
    }
}
