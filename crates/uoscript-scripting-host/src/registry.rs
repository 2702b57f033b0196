use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::Script;
use super::error::ScriptLoadError;
use super::script_runner::ScriptEngine;
use super::scripts::{
    BandageRotationScript, GumpAutoReplyScript, HelloWorldScript, JournalAlertScript,
};
use uoscript_client::client::{ClientAction, TaskId};
use uoscript_client::config::{EngineConfig, ScriptingConfig};
use uoscript_events::EventSender;

/// Ids of the scripts shipped with the engine
pub fn builtin_script_ids() -> &'static [&'static str] {
    &[
        "bandage_rotation",
        "gump_auto_reply",
        "hello_world",
        "journal_alert",
    ]
}

/// Build a shipped script from its id and `[scripting.config.<id>]` table
pub fn builtin_script(
    id: &str,
    config: Option<&toml::Value>,
) -> Result<Box<dyn Script>, ScriptLoadError> {
    let script: Box<dyn Script> = match id {
        "hello_world" => Box::new(HelloWorldScript),
        "bandage_rotation" => Box::new(BandageRotationScript::new(config)?),
        "gump_auto_reply" => Box::new(GumpAutoReplyScript::new(config)?),
        "journal_alert" => Box::new(JournalAlertScript::new(config)?),
        other => return Err(ScriptLoadError::UnknownScript(other.to_string())),
    };
    Ok(script)
}

/// Create a script engine from config and start the autostart scripts.
///
/// A script that fails to load is logged and skipped; the rest still start.
pub fn create_engine_from_config(
    engine_config: &EngineConfig,
    scripting: &ScriptingConfig,
    action_tx: UnboundedSender<ClientAction>,
    events: Option<EventSender>,
) -> ScriptEngine {
    debug!(target: "scripting", "Creating script engine");
    let mut engine = ScriptEngine::new(engine_config, action_tx);
    if let Some(events) = events {
        engine = engine.with_events(events);
    }

    if !scripting.enabled {
        debug!(target: "scripting", "Scripting disabled, not starting any scripts");
        return engine;
    }

    let mut started = 0;
    for id in &scripting.autostart {
        match start_script(&mut engine, scripting, id) {
            Ok(_) => started += 1,
            Err(e) => warn!(target: "scripting", "Skipping {}: {}", id, e),
        }
    }
    if started > 0 {
        info!(target: "scripting", "Started {} script(s)", started);
    }
    engine
}

fn start_script(
    engine: &mut ScriptEngine,
    scripting: &ScriptingConfig,
    id: &str,
) -> Result<TaskId, ScriptLoadError> {
    if !scripting.is_script_enabled(id) {
        return Err(ScriptLoadError::Disabled(id.to_string()));
    }
    let script = builtin_script(id, scripting.script_config(id))?;
    engine.spawn(script.as_ref())
}
