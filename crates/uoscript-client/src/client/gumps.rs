use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::slots::{AnswerError, InteractionSlot};
use super::types::{Serial, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GumpButton {
    pub id: u32,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GumpTextEntry {
    pub id: u32,
    #[serde(default)]
    pub text: String,
}

/// A server-driven UI panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gump {
    pub serial: Serial,
    pub gump_id: u32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub buttons: Vec<GumpButton>,
    #[serde(default)]
    pub text_entries: Vec<GumpTextEntry>,
}

impl Gump {
    pub fn new(serial: Serial, gump_id: u32) -> Self {
        Self {
            serial,
            gump_id,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            lines: Vec::new(),
            buttons: Vec::new(),
            text_entries: Vec::new(),
        }
    }

    pub fn line(&self, line_number: usize) -> Option<&str> {
        self.lines.get(line_number).map(String::as_str)
    }

    pub fn text(&self, entry_id: u32) -> Option<&str> {
        self.text_entries
            .iter()
            .find(|entry| entry.id == entry_id)
            .map(|entry| entry.text.as_str())
    }

    /// Id of the first button whose label contains `text`, ignoring case
    pub fn find_button(&self, text: &str) -> Option<u32> {
        let needle = text.to_lowercase();
        self.buttons
            .iter()
            .find(|button| button.label.to_lowercase().contains(&needle))
            .map(|button| button.id)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.lines
            .iter()
            .any(|line| line.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone)]
struct ShownGump {
    slot: InteractionSlot<Gump>,
    arrived: u64,
}

/// Open gumps keyed by gump id; distinct ids coexist, a repeat id replaces
#[derive(Debug, Clone, Default)]
pub struct GumpTable {
    shown: BTreeMap<u32, ShownGump>,
    next_arrival: u64,
}

impl GumpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a gump with the same id was replaced
    pub fn show(&mut self, gump: Gump) -> bool {
        let arrived = self.next_arrival;
        self.next_arrival += 1;
        let entry = self.shown.entry(gump.gump_id).or_insert_with(|| ShownGump {
            slot: InteractionSlot::new("gump"),
            arrived,
        });
        entry.arrived = arrived;
        entry.slot.offer(gump)
    }

    pub fn close(&mut self, gump_id: u32) -> Option<Gump> {
        self.shown
            .remove(&gump_id)
            .and_then(|mut shown| shown.slot.clear())
    }

    /// Close every gump, returning them in arrival order
    pub fn close_all(&mut self) -> Vec<Gump> {
        let mut shown: Vec<ShownGump> = std::mem::take(&mut self.shown).into_values().collect();
        shown.sort_by_key(|s| s.arrived);
        shown.into_iter().filter_map(|mut s| s.slot.clear()).collect()
    }

    /// Gump by id, or the most recent one when no id is given
    pub fn get(&self, gump_id: Option<u32>) -> Option<&Gump> {
        match gump_id {
            Some(id) => self.shown.get(&id).and_then(|s| s.slot.request()),
            None => self
                .shown
                .values()
                .max_by_key(|s| s.arrived)
                .and_then(|s| s.slot.request()),
        }
    }

    /// Open gumps matching `gump_id` (all when None), oldest first
    pub fn all(&self, gump_id: Option<u32>) -> Vec<&Gump> {
        let mut shown: Vec<&ShownGump> = self
            .shown
            .iter()
            .filter(|(id, _)| gump_id.is_none_or(|wanted| **id == wanted))
            .map(|(_, s)| s)
            .collect();
        shown.sort_by_key(|s| s.arrived);
        shown.into_iter().filter_map(|s| s.slot.request()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    /// Claim the newest unclaimed gump matching `gump_id` for `task`
    pub fn claim(&mut self, gump_id: Option<u32>, task: TaskId) -> Option<u32> {
        let id = self
            .shown
            .iter()
            .filter(|(id, s)| gump_id.is_none_or(|wanted| **id == wanted) && s.slot.is_claimable())
            .max_by_key(|(_, s)| s.arrived)
            .map(|(id, _)| *id)?;
        let shown = self.shown.get_mut(&id)?;
        shown.slot.claim(task).then_some(id)
    }

    pub fn has_claimable(&self, gump_id: Option<u32>) -> bool {
        self.shown
            .iter()
            .any(|(id, s)| gump_id.is_none_or(|wanted| *id == wanted) && s.slot.is_claimable())
    }

    /// Consume a gump to answer it; the gump leaves the table
    pub fn answer(&mut self, gump_id: u32, task: TaskId) -> Result<Gump, AnswerError> {
        let shown = self.shown.get_mut(&gump_id).ok_or(AnswerError::Idle)?;
        let gump = shown.slot.answer(task)?;
        self.shown.remove(&gump_id);
        Ok(gump)
    }

    /// Gump ids currently claimed by `task`
    pub fn claimed_by(&self, task: TaskId) -> Vec<u32> {
        self.shown
            .iter()
            .filter(|(_, s)| s.slot.owner() == Some(task))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn release(&mut self, gump_id: u32, task: TaskId) -> bool {
        self.shown
            .get_mut(&gump_id)
            .is_some_and(|s| s.slot.release(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gump(gump_id: u32) -> Gump {
        let mut gump = Gump::new(0x4000_0001, gump_id);
        gump.lines = vec!["Select an option".to_string(), "Okay".to_string()];
        gump.buttons = vec![
            GumpButton { id: 0, label: "Cancel".to_string() },
            GumpButton { id: 7, label: "Accept Quest".to_string() },
        ];
        gump.text_entries = vec![GumpTextEntry { id: 3, text: "name".to_string() }];
        gump
    }

    #[test]
    fn test_distinct_ids_coexist() {
        let mut table = GumpTable::new();
        assert!(!table.show(gump(1)));
        assert!(!table.show(gump(2)));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(None).map(|g| g.gump_id), Some(2));

        assert!(table.show(gump(1)));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(None).map(|g| g.gump_id), Some(1));
    }

    #[test]
    fn test_claim_newest_matching() {
        let mut table = GumpTable::new();
        table.show(gump(1));
        table.show(gump(2));

        assert_eq!(table.claim(None, TaskId(1)), Some(2));
        assert_eq!(table.claim(None, TaskId(2)), Some(1));
        assert_eq!(table.claim(None, TaskId(3)), None);
        assert_eq!(table.claimed_by(TaskId(1)), vec![2]);
    }

    #[test]
    fn test_claim_by_id() {
        let mut table = GumpTable::new();
        table.show(gump(1));
        table.show(gump(2));

        assert_eq!(table.claim(Some(1), TaskId(1)), Some(1));
        assert_eq!(table.claim(Some(1), TaskId(2)), None);
        assert_eq!(table.claim(Some(9), TaskId(2)), None);
        assert!(table.has_claimable(Some(2)));
        assert!(!table.has_claimable(Some(1)));
    }

    #[test]
    fn test_answer_removes_gump() {
        let mut table = GumpTable::new();
        table.show(gump(5));
        table.claim(Some(5), TaskId(1));

        assert!(table.answer(5, TaskId(2)).is_err());
        assert!(table.answer(5, TaskId(1)).is_ok());
        assert!(table.is_empty());
    }

    #[test]
    fn test_gump_lookups() {
        let gump = gump(9);
        assert_eq!(gump.find_button("accept"), Some(7));
        assert_eq!(gump.find_button("nope"), None);
        assert!(gump.contains_text("select"));
        assert_eq!(gump.text(3), Some("name"));
        assert_eq!(gump.line(1), Some("Okay"));
    }
}
