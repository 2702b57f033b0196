use uoscript_client::client::Serial;

/// Why a script body stopped before returning normally
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// Raised by `exit()`; ends the task without counting as a failure
    #[error("script exited")]
    Exit,
    #[error("{0}")]
    Failed(String),
    #[error("object 0x{0:08X} does not exist")]
    InvalidReference(Serial),
}

impl ScriptError {
    pub fn failed(message: impl Into<String>) -> Self {
        ScriptError::Failed(message.into())
    }
}

pub type ScriptResult = Result<(), ScriptError>;

/// A script could not be prepared for spawning
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptLoadError {
    #[error("unknown script: {0}")]
    UnknownScript(String),
    #[error("invalid config for {script_id}: {message}")]
    InvalidConfig { script_id: String, message: String },
    #[error("script {0} is disabled")]
    Disabled(String),
}
