use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::types::MessageType;

/// Default number of retained journal entries
pub const DEFAULT_JOURNAL_CAPACITY: usize = 250;

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// Monotonic insertion sequence, starting at 1
    pub sequence: u64,
    pub text: String,
    pub author: String,
    pub message_type: MessageType,
    pub hue: u16,
    pub timestamp: DateTime<Utc>,
}

/// Criteria for journal searches and waits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextQuery {
    pub text: String,
    pub author: Option<String>,
    pub message_type: Option<MessageType>,
    pub hue: Option<u16>,
    pub ignore_case: bool,
}

impl TextQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn author(mut self, author: Option<&str>) -> Self {
        self.author = author.map(str::to_string);
        self
    }

    pub fn message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn hue(mut self, hue: u16) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(author) = &self.author
            && !entry.author.eq_ignore_ascii_case(author)
        {
            return false;
        }
        if self.message_type.is_some_and(|t| t != entry.message_type) {
            return false;
        }
        if self.hue.is_some_and(|h| h != entry.hue) {
            return false;
        }
        if self.ignore_case {
            entry
                .text
                .to_lowercase()
                .contains(&self.text.to_lowercase())
        } else {
            entry.text.contains(&self.text)
        }
    }
}

/// Bounded, append-only log of in-game text
#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    last_sequence: u64,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            last_sequence: 0,
        }
    }

    /// Append an entry, evicting the oldest when full. Returns its sequence number.
    pub fn append(
        &mut self,
        text: impl Into<String>,
        author: impl Into<String>,
        message_type: MessageType,
        hue: u16,
    ) -> u64 {
        self.last_sequence += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            sequence: self.last_sequence,
            text: text.into(),
            author: author.into(),
            message_type,
            hue,
            timestamp: Utc::now(),
        });
        self.last_sequence
    }

    /// Sequence number of the most recent append (0 before any)
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn search(&self, query: &TextQuery) -> bool {
        self.entries.iter().any(|entry| query.matches(entry))
    }

    /// First matching entry appended after `sequence`
    pub fn find_after(&self, query: &TextQuery, sequence: u64) -> Option<&JournalEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.sequence > sequence)
            .find(|entry| query.matches(entry))
    }

    /// Texts of a given type, oldest first
    pub fn text_by_type(&self, message_type: MessageType, author: Option<&str>) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.message_type == message_type)
            .filter(|entry| author.is_none_or(|a| entry.author.eq_ignore_ascii_case(a)))
            .map(|entry| entry.text.clone())
            .collect()
    }

    /// Entry text by position, 0 being the oldest retained
    pub fn text(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.text.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop retained entries. The sequence counter keeps counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_non_consuming() {
        let mut journal = Journal::default();
        journal.append("You put the bandage on.", "System", MessageType::System, 0x3B2);

        let query = TextQuery::new("bandage");
        assert!(journal.search(&query));
        assert!(journal.search(&query));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_case_folding() {
        let mut journal = Journal::default();
        journal.append("Hello There", "Bob", MessageType::Regular, 0);

        assert!(!journal.search(&TextQuery::new("hello")));
        assert!(journal.search(&TextQuery::new("hello").ignore_case(true)));
    }

    #[test]
    fn test_filters() {
        let mut journal = Journal::default();
        journal.append("guards!", "Bob", MessageType::Yell, 0x22);

        assert!(journal.search(&TextQuery::new("guards").author(Some("bob"))));
        assert!(!journal.search(&TextQuery::new("guards").author(Some("alice"))));
        assert!(journal.search(&TextQuery::new("guards").message_type(MessageType::Yell)));
        assert!(!journal.search(&TextQuery::new("guards").message_type(MessageType::Regular)));
        assert!(journal.search(&TextQuery::new("guards").hue(0x22)));
        assert!(!journal.search(&TextQuery::new("guards").hue(0x23)));
    }

    #[test]
    fn test_bounded_fifo() {
        let mut journal = Journal::new(2);
        journal.append("one", "", MessageType::System, 0);
        journal.append("two", "", MessageType::System, 0);
        journal.append("three", "", MessageType::System, 0);

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.text(0), Some("two"));
        assert_eq!(journal.text(1), Some("three"));
        assert_eq!(journal.text(2), None);
        assert_eq!(journal.last_sequence(), 3);
    }

    #[test]
    fn test_clear_keeps_sequence() {
        let mut journal = Journal::default();
        journal.append("before", "", MessageType::System, 0);
        let seq = journal.last_sequence();
        journal.clear();
        assert!(journal.is_empty());

        let next = journal.append("after", "", MessageType::System, 0);
        assert!(next > seq);
        assert!(journal.find_after(&TextQuery::new("after"), seq).is_some());
    }

    #[test]
    fn test_find_after_skips_older_entries() {
        let mut journal = Journal::default();
        journal.append("Hello", "Bob", MessageType::Regular, 0);
        let baseline = journal.last_sequence();

        assert!(journal.find_after(&TextQuery::new("Hello"), baseline).is_none());
        journal.append("Hello again", "Bob", MessageType::Regular, 0);
        assert!(journal.find_after(&TextQuery::new("Hello"), baseline).is_some());
    }

    #[test]
    fn test_text_by_type() {
        let mut journal = Journal::default();
        journal.append("a", "Bob", MessageType::Regular, 0);
        journal.append("b", "System", MessageType::System, 0);
        journal.append("c", "Alice", MessageType::Regular, 0);

        assert_eq!(journal.text_by_type(MessageType::Regular, None), vec!["a", "c"]);
        assert_eq!(journal.text_by_type(MessageType::Regular, Some("alice")), vec!["c"]);
    }
}
