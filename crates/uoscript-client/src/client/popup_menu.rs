use serde::{Deserialize, Serialize};

use super::types::Serial;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub index: u16,
    pub text: String,
}

/// A context menu shown for an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRequest {
    pub serial: Serial,
    #[serde(default)]
    pub options: Vec<MenuOption>,
}

/// How a script picks a menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    Index(u16),
    Text(String),
}

impl From<u16> for MenuSelection {
    fn from(index: u16) -> Self {
        MenuSelection::Index(index)
    }
}

impl From<&str> for MenuSelection {
    fn from(text: &str) -> Self {
        MenuSelection::Text(text.to_string())
    }
}

impl MenuRequest {
    /// Resolve a selection to an option index. Text matches ignore case but not substrings.
    pub fn resolve(&self, selection: &MenuSelection) -> Option<u16> {
        match selection {
            MenuSelection::Index(index) => self
                .options
                .iter()
                .find(|option| option.index == *index)
                .map(|option| option.index),
            MenuSelection::Text(text) => self
                .options
                .iter()
                .find(|option| option.text.eq_ignore_ascii_case(text))
                .map(|option| option.index),
        }
    }

    pub fn option_texts(&self) -> Vec<String> {
        self.options.iter().map(|option| option.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> MenuRequest {
        MenuRequest {
            serial: 0x100,
            options: vec![
                MenuOption { index: 1, text: "Open Bankbox".to_string() },
                MenuOption { index: 4, text: "Buy".to_string() },
            ],
        }
    }

    #[test]
    fn test_resolve_by_index() {
        assert_eq!(menu().resolve(&4.into()), Some(4));
        assert_eq!(menu().resolve(&2.into()), None);
    }

    #[test]
    fn test_resolve_by_text_is_exact() {
        assert_eq!(menu().resolve(&"open bankbox".into()), Some(1));
        assert_eq!(menu().resolve(&"Bank".into()), None);
    }
}
