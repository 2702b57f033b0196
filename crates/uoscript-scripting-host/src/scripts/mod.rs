//! Scripts shipped with the engine, started by id from the `autostart` list

mod bandage_rotation;
mod gump_auto_reply;
mod hello_world;
mod journal_alert;

pub use bandage_rotation::{BandageRotationConfig, BandageRotationScript};
pub use gump_auto_reply::{GumpAutoReplyConfig, GumpAutoReplyScript};
pub use hello_world::HelloWorldScript;
pub use journal_alert::{JournalAlertConfig, JournalAlertScript};

use serde::de::DeserializeOwned;

use crate::error::ScriptLoadError;

/// Read a script's `[scripting.config.<id>]` table, using defaults for missing keys
pub(crate) fn parse_config<T>(script_id: &str, config: Option<&toml::Value>) -> Result<T, ScriptLoadError>
where
    T: DeserializeOwned + Default,
{
    let Some(value) = config else {
        return Ok(T::default());
    };
    value
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| ScriptLoadError::InvalidConfig {
            script_id: script_id.to_string(),
            message: e.message().to_string(),
        })
}
