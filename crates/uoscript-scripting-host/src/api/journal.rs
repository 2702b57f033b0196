use crate::context::ScriptApi;
use crate::wait::WaitCondition;
use uoscript_client::client::journal::TextQuery;
use uoscript_client::client::types::MessageType;

pub struct JournalApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> JournalApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    pub fn clear(&self) {
        self.api.write(|state| state.journal.clear());
    }

    pub fn search(&self, text: &str, author: Option<&str>, ignore_case: bool) -> bool {
        let query = TextQuery::new(text).author(author).ignore_case(ignore_case);
        self.api.read(|state| state.journal.search(&query))
    }

    pub fn search_by_type(&self, text: &str, message_type: MessageType, ignore_case: bool) -> bool {
        let query = TextQuery::new(text)
            .message_type(message_type)
            .ignore_case(ignore_case);
        self.api.read(|state| state.journal.search(&query))
    }

    pub fn search_by_color(&self, text: &str, hue: u16, ignore_case: bool) -> bool {
        let query = TextQuery::new(text).hue(hue).ignore_case(ignore_case);
        self.api.read(|state| state.journal.search(&query))
    }

    /// Wait for matching text appended after this call
    pub async fn wait_for_text(
        &self,
        text: &str,
        author: Option<&str>,
        timeout: Option<u64>,
        ignore_case: bool,
    ) -> bool {
        let query = TextQuery::new(text).author(author).ignore_case(ignore_case);
        self.wait_for(query, timeout).await
    }

    pub async fn wait_for_text_by_type(
        &self,
        text: &str,
        message_type: MessageType,
        timeout: Option<u64>,
        ignore_case: bool,
    ) -> bool {
        let query = TextQuery::new(text)
            .message_type(message_type)
            .ignore_case(ignore_case);
        self.wait_for(query, timeout).await
    }

    async fn wait_for(&self, query: TextQuery, timeout: Option<u64>) -> bool {
        let after = self.api.read(|state| state.journal.last_sequence());
        self.api
            .suspend(WaitCondition::Text { query, after }, timeout)
            .await
    }

    pub fn get_text_by_type(&self, message_type: MessageType, author: Option<&str>) -> Vec<String> {
        self.api
            .read(|state| state.journal.text_by_type(message_type, author))
    }

    pub fn get_journal_text(&self, index: usize) -> Option<String> {
        self.api
            .read(|state| state.journal.text(index).map(str::to_string))
    }

    pub fn length(&self) -> usize {
        self.api.read(|state| state.journal.len())
    }
}
