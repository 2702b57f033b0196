use crate::context::ScriptApi;
use uoscript_client::client::Serial;

pub struct IgnoreListApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> IgnoreListApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    pub fn add(&self, serial: Serial) {
        self.api.write(|state| state.ignore_list.add(serial));
    }

    pub fn remove(&self, serial: Serial) {
        self.api.write(|state| state.ignore_list.remove(serial));
    }

    pub fn clear(&self) {
        self.api.write(|state| state.ignore_list.clear());
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.api.read(|state| state.ignore_list.contains(serial))
    }

    pub fn list(&self) -> Vec<Serial> {
        self.api.read(|state| state.ignore_list.list())
    }
}
