use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use super::parse_config;
use crate::{Script, ScriptApi, ScriptLoadError, ScriptResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JournalAlertConfig {
    /// Journal text that raises the alert
    pub text: String,
    pub author: Option<String>,
    pub ignore_case: bool,
    /// Shown as a system message when the text appears
    pub message: String,
    pub hue: u16,
}

impl Default for JournalAlertConfig {
    fn default() -> Self {
        Self {
            text: "You are frozen".to_string(),
            author: None,
            ignore_case: true,
            message: "Alert!".to_string(),
            hue: 0x21,
        }
    }
}

/// Raises a system message whenever a journal line appears
pub struct JournalAlertScript {
    config: JournalAlertConfig,
}

impl JournalAlertScript {
    pub fn new(config: Option<&toml::Value>) -> Result<Self, ScriptLoadError> {
        let config: JournalAlertConfig = parse_config("journal_alert", config)?;
        if config.text.is_empty() {
            return Err(ScriptLoadError::InvalidConfig {
                script_id: "journal_alert".to_string(),
                message: "text must not be empty".to_string(),
            });
        }
        Ok(Self { config })
    }
}

impl Script for JournalAlertScript {
    fn id(&self) -> &'static str {
        "journal_alert"
    }

    fn name(&self) -> &'static str {
        "Journal Alert"
    }

    fn description(&self) -> &'static str {
        "Shows a system message whenever a configured journal line appears"
    }

    fn start(
        &self,
        api: ScriptApi,
    ) -> Result<LocalBoxFuture<'static, ScriptResult>, ScriptLoadError> {
        Ok(watch(api, self.config.clone()).boxed_local())
    }
}

async fn watch(api: ScriptApi, config: JournalAlertConfig) -> ScriptResult {
    loop {
        let seen = api
            .journal()
            .wait_for_text(&config.text, config.author.as_deref(), None, config.ignore_case)
            .await;
        if seen {
            api.client().sys_msg(&config.message, Some(config.hue));
            api.log(format!("Saw \"{}\"", config.text));
        }
    }
}
