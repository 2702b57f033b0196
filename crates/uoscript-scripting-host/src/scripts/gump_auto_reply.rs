use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use super::parse_config;
use crate::{Script, ScriptApi, ScriptLoadError, ScriptResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GumpAutoReplyConfig {
    /// Only answer this gump id; any gump when unset
    pub gump_id: Option<u32>,
    /// Button to press. Ignored when `button_label` matches a button.
    pub button_id: u32,
    pub button_label: Option<String>,
    /// Stop after this many replies; run forever when unset
    pub max_replies: Option<u32>,
}

/// Answers a recurring gump with a fixed button
pub struct GumpAutoReplyScript {
    config: GumpAutoReplyConfig,
}

impl GumpAutoReplyScript {
    pub fn new(config: Option<&toml::Value>) -> Result<Self, ScriptLoadError> {
        Ok(Self {
            config: parse_config("gump_auto_reply", config)?,
        })
    }
}

impl Script for GumpAutoReplyScript {
    fn id(&self) -> &'static str {
        "gump_auto_reply"
    }

    fn name(&self) -> &'static str {
        "Gump Auto Reply"
    }

    fn description(&self) -> &'static str {
        "Presses a configured button on every matching gump"
    }

    fn start(
        &self,
        api: ScriptApi,
    ) -> Result<LocalBoxFuture<'static, ScriptResult>, ScriptLoadError> {
        let config = self.config.clone();
        Ok(async move {
            let mut replies = 0;
            while config.max_replies.is_none_or(|max| replies < max) {
                if !api.gump().wait_for_gump(config.gump_id, None).await {
                    continue;
                }
                let Some(gump) = api.gump().find_gump(config.gump_id) else {
                    continue;
                };

                let button = config
                    .button_label
                    .as_deref()
                    .and_then(|label| gump.find_button(label))
                    .unwrap_or(config.button_id);
                if gump.reply(button, &[], &[]) {
                    replies += 1;
                    api.log(format!("Replied to gump {} with button {}", gump.gump_id, button));
                }
            }
            Ok(())
        }
        .boxed_local())
    }
}
