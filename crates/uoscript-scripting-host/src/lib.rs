/// Cooperative script scheduler for the game client
///
/// Scripts are native async bodies driven by `ScriptEngine::tick`. A body only
/// yields at the blocking calls of `ScriptApi` (`sleep`, `wait_*`), so every other
/// call runs to completion against the shared session before another task runs.
use futures::future::LocalBoxFuture;

pub mod api;
pub mod context;
pub mod error;
pub mod registry;
pub mod script_runner;
pub mod scripts;
pub mod task;
pub mod timer;
pub mod wait;

pub use context::ScriptApi;
pub use error::{ScriptError, ScriptLoadError, ScriptResult};
pub use registry::{builtin_script, builtin_script_ids, create_engine_from_config};
pub use script_runner::{ScriptConsumer, ScriptEngine, TaskOutcome, TickReport};
pub use task::TaskStatus;
pub use timer::{TimerId, TimerManager};
pub use uoscript_client::client::TaskId;
pub use wait::{TargetWait, WaitCondition};

/// Trait that scripts must implement
pub trait Script: 'static {
    /// Unique identifier for this script (e.g., "hello_world")
    fn id(&self) -> &'static str;

    /// Human-readable name for this script
    fn name(&self) -> &'static str;

    /// Description of what this script does
    fn description(&self) -> &'static str;

    /// Build the body of a new task. The body owns `api` for its whole run.
    fn start(&self, api: ScriptApi)
    -> Result<LocalBoxFuture<'static, ScriptResult>, ScriptLoadError>;
}
