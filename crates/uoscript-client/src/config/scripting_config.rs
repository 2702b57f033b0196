use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptingConfig {
    /// Whether scripting is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Built-in script ids spawned when the session starts
    #[serde(default)]
    pub autostart: Vec<String>,

    /// Per-script configuration (script ID -> config values)
    #[serde(default)]
    pub config: HashMap<String, toml::Value>,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autostart: Vec::new(),
            config: HashMap::new(),
        }
    }
}

impl ScriptingConfig {
    /// Parameters for one script, if any were configured
    pub fn script_config(&self, script_id: &str) -> Option<&toml::Value> {
        self.config.get(script_id)
    }

    /// A script is enabled unless its config table sets `enabled = false`
    pub fn is_script_enabled(&self, script_id: &str) -> bool {
        self.script_config(script_id)
            .and_then(|value| value.get("enabled"))
            .and_then(toml::Value::as_bool)
            .unwrap_or(true)
    }
}
