use crate::context::ScriptApi;
use crate::wait::WaitCondition;
use uoscript_client::client::popup_menu::MenuSelection;

pub struct PopupMenuApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> PopupMenuApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    pub async fn wait_for_menu(&self, timeout: Option<u64>) -> bool {
        self.api.suspend(WaitCondition::Menu, timeout).await
    }

    /// Pick an entry by index or by its exact text (case-insensitive)
    pub fn select(&self, option: impl Into<MenuSelection>) -> bool {
        let task = self.api.task_id();
        let selection = option.into();
        let selected = self
            .api
            .write(|state| state.select_menu(task, &selection).ok().flatten());
        match selected {
            Some(action) => {
                self.api.send(action);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&self) {
        self.api.act(|state| state.cancel_menu());
    }

    pub fn has_menu(&self) -> bool {
        self.api.read(|state| !state.menu.is_idle())
    }

    pub fn get_menu_options(&self) -> Vec<String> {
        self.api.read(|state| {
            state
                .menu
                .request()
                .map(|menu| menu.option_texts())
                .unwrap_or_default()
        })
    }
}
