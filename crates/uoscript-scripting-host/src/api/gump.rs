use std::ops::Deref;

use crate::context::ScriptApi;
use crate::wait::WaitCondition;
use uoscript_client::client::ClientAction;
use uoscript_client::client::gumps::{Gump, GumpTextEntry};

/// Static gump functions
pub struct GumpApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> GumpApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    /// The gump with this id, or the most recent one
    pub fn find_gump(&self, gump_id: Option<u32>) -> Option<GumpRef<'a>> {
        let gump = self.api.read(|state| state.gumps.get(gump_id).cloned())?;
        Some(GumpRef { api: self.api, gump })
    }

    pub fn find_gumps(&self, gump_id: Option<u32>) -> Vec<GumpRef<'a>> {
        let gumps: Vec<Gump> = self
            .api
            .read(|state| state.gumps.all(gump_id).into_iter().cloned().collect());
        gumps
            .into_iter()
            .map(|gump| GumpRef { api: self.api, gump })
            .collect()
    }

    pub fn close_gump(&self, gump_id: u32) {
        self.api.act(|state| state.close_gump(gump_id));
    }

    pub fn close_all_gumps(&self) {
        self.api.act(|state| state.close_all_gumps());
    }

    pub fn has_gump(&self) -> bool {
        self.api.read(|state| !state.gumps.is_empty())
    }

    /// Wait for a gump (any id when None) and claim it for this task
    pub async fn wait_for_gump(&self, gump_id: Option<u32>, timeout: Option<u64>) -> bool {
        self.api
            .suspend(WaitCondition::Gump { gump_id }, timeout)
            .await
    }
}

/// A gump as seen when it was looked up
pub struct GumpRef<'a> {
    api: &'a ScriptApi,
    gump: Gump,
}

impl Deref for GumpRef<'_> {
    type Target = Gump;

    fn deref(&self) -> &Gump {
        &self.gump
    }
}

impl GumpRef<'_> {
    /// Press a button. `text_entries` pairs entry ids with their text.
    pub fn reply(&self, button_id: u32, switches: &[u32], text_entries: &[(u32, &str)]) -> bool {
        let task = self.api.task_id();
        let entries = text_entries
            .iter()
            .map(|(id, text)| GumpTextEntry {
                id: *id,
                text: text.to_string(),
            })
            .collect();
        let reply = self.api.write(|state| {
            state
                .reply_gump(task, self.gump.gump_id, button_id, switches.to_vec(), entries)
                .ok()
        });
        match reply {
            Some(action) => {
                self.api.send(action);
                true
            }
            None => false,
        }
    }

    pub fn close(&self) {
        self.api.act(|state| state.close_gump(self.gump.gump_id));
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        self.gump.line(line_number)
    }

    pub fn get_lines(&self) -> &[String] {
        &self.gump.lines
    }

    pub fn get_text(&self, entry_id: u32) -> Option<&str> {
        self.gump.text(entry_id)
    }

    pub fn send_action(&self, element_id: u32, action: &str) {
        self.api.send(ClientAction::GumpAction {
            gump_id: self.gump.gump_id,
            element_id,
            action: action.to_string(),
        });
    }

    pub fn find_button(&self, text: &str) -> Option<u32> {
        self.gump.find_button(text)
    }

    pub fn find_text(&self, text: &str) -> bool {
        self.gump.contains_text(text)
    }
}
