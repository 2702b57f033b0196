use crate::context::ScriptApi;
use crate::wait::WaitCondition;

pub struct PromptApi<'a> {
    api: &'a ScriptApi,
}

impl<'a> PromptApi<'a> {
    pub(crate) fn new(api: &'a ScriptApi) -> Self {
        Self { api }
    }

    /// Wait for a prompt and claim it for this task
    pub async fn wait_for_prompt(&self, timeout: Option<u64>) -> bool {
        self.api.suspend(WaitCondition::Prompt, timeout).await
    }

    pub fn respond(&self, text: &str) {
        let task = self.api.task_id();
        self.api.act(|state| state.respond_prompt(task, text).ok());
    }

    pub fn cancel(&self) {
        self.api.act(|state| state.cancel_prompt());
    }

    pub fn has_prompt(&self) -> bool {
        self.api.read(|state| !state.prompt.is_idle())
    }
}
