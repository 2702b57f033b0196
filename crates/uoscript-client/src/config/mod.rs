pub mod engine_config;
pub mod paths;
pub mod scripting_config;
pub mod uoscript_config;

pub use engine_config::EngineConfig;
pub use paths::ProjectPaths;
pub use scripting_config::ScriptingConfig;
pub use uoscript_config::{ConfigLoadError, UoScriptConfig};
