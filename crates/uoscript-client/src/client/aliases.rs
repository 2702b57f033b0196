use std::collections::{HashMap, VecDeque};

use super::types::Serial;

/// Default number of previous holders remembered per alias
pub const DEFAULT_HISTORY_LIMIT: usize = 8;

#[derive(Debug, Clone)]
struct AliasEntry {
    current: Serial,
    /// Previous holders, most recent first. Never holds `current` or duplicates.
    history: VecDeque<Serial>,
}

/// Script-defined names bound to serials, shared by every task of an engine
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, AliasEntry>,
    history_limit: usize,
}

impl AliasTable {
    pub fn new(history_limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            history_limit,
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    pub fn get(&self, name: &str) -> Option<Serial> {
        self.entries.get(&Self::key(name)).map(|entry| entry.current)
    }

    /// Bind `name` to `serial`, moving the previous holder into history
    pub fn set(&mut self, name: &str, serial: Serial) {
        let limit = self.history_limit;
        match self.entries.get_mut(&Self::key(name)) {
            Some(entry) => {
                if entry.current == serial {
                    return;
                }
                entry.history.retain(|&held| held != serial);
                entry.history.push_front(entry.current);
                entry.history.truncate(limit);
                entry.current = serial;
            }
            None => {
                self.entries.insert(
                    Self::key(name),
                    AliasEntry {
                        current: serial,
                        history: VecDeque::new(),
                    },
                );
            }
        }
    }

    pub fn unset(&mut self, name: &str) -> Option<Serial> {
        self.entries.remove(&Self::key(name)).map(|entry| entry.current)
    }

    /// Rotate to the most recent previous holder. The current holder becomes the
    /// oldest history entry so repeated promotion cycles through every holder.
    pub fn promote(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(&Self::key(name)) else {
            return false;
        };
        let Some(next) = entry.history.pop_front() else {
            return false;
        };
        entry.history.push_back(entry.current);
        entry.current = next;
        true
    }

    /// Previous holders of `name`, most recent first
    pub fn history(&self, name: &str) -> Vec<Serial> {
        self.entries
            .get(&Self::key(name))
            .map(|entry| entry.history.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_assignment_wins() {
        let mut aliases = AliasTable::default();
        aliases.set("bandage", 1);
        aliases.set("bandage", 2);
        aliases.set("Bandage", 3);
        assert_eq!(aliases.get("BANDAGE"), Some(3));
        assert_eq!(aliases.history("bandage"), vec![2, 1]);
    }

    #[test]
    fn test_promote_rotates_through_history() {
        let mut aliases = AliasTable::default();
        aliases.set("heal", 0xA);
        aliases.set("heal", 0xB);
        aliases.set("heal", 0xC);

        assert!(aliases.promote("heal"));
        assert_eq!(aliases.get("heal"), Some(0xB));
        assert!(aliases.promote("heal"));
        assert_eq!(aliases.get("heal"), Some(0xA));
        assert!(aliases.promote("heal"));
        assert_eq!(aliases.get("heal"), Some(0xC));
        assert_eq!(aliases.history("heal"), vec![0xB, 0xA]);
    }

    #[test]
    fn test_promote_without_history() {
        let mut aliases = AliasTable::default();
        assert!(!aliases.promote("missing"));
        aliases.set("solo", 7);
        assert!(!aliases.promote("solo"));
        assert_eq!(aliases.get("solo"), Some(7));
    }

    #[test]
    fn test_reassigning_a_historical_holder() {
        let mut aliases = AliasTable::default();
        aliases.set("pet", 1);
        aliases.set("pet", 2);
        aliases.set("pet", 1);
        assert_eq!(aliases.get("pet"), Some(1));
        assert_eq!(aliases.history("pet"), vec![2]);

        // Same holder again is a no-op
        aliases.set("pet", 1);
        assert_eq!(aliases.history("pet"), vec![2]);
    }

    #[test]
    fn test_history_limit() {
        let mut aliases = AliasTable::new(2);
        for serial in 1..=5 {
            aliases.set("rot", serial);
        }
        assert_eq!(aliases.get("rot"), Some(5));
        assert_eq!(aliases.history("rot"), vec![4, 3]);
    }

    #[test]
    fn test_unset() {
        let mut aliases = AliasTable::default();
        aliases.set("friend", 9);
        assert_eq!(aliases.unset("friend"), Some(9));
        assert_eq!(aliases.get("friend"), None);
        assert_eq!(aliases.unset("friend"), None);
    }
}
