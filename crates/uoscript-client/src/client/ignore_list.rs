use std::collections::BTreeSet;

use super::types::Serial;

/// Serials excluded from entity searches
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    serials: BTreeSet<Serial>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, serial: Serial) {
        self.serials.insert(serial);
    }

    pub fn remove(&mut self, serial: Serial) -> bool {
        self.serials.remove(&serial)
    }

    pub fn clear(&mut self) {
        self.serials.clear();
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.serials.contains(&serial)
    }

    /// Ignored serials in ascending order
    pub fn list(&self) -> Vec<Serial> {
        self.serials.iter().copied().collect()
    }
}
