use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{engine_config::EngineConfig, paths::ProjectPaths, scripting_config::ScriptingConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("IO error reading config: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UoScriptConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Scripting configuration
    #[serde(default)]
    pub scripting: ScriptingConfig,
}

impl UoScriptConfig {
    /// Default location, falling back to the working directory without a home dir
    pub fn config_path() -> PathBuf {
        ProjectPaths::new("uoscript")
            .map(|paths| paths.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("uoscript.toml"))
    }

    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound);
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = UoScriptConfig::load_from(&dir.path().join("config.toml"));
        assert!(matches!(result, Err(ConfigLoadError::NotFound)));
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [engine]
            tick_interval_ms = 100

            [scripting]
            autostart = ["hello_world"]

            [scripting.config.journal_alert]
            enabled = false
            pattern = "guards"
            "#,
        )
        .unwrap();

        let config = UoScriptConfig::load_from(&path).unwrap();
        assert_eq!(config.engine.tick_interval_ms, 100);
        assert_eq!(config.engine.journal_capacity, 250);
        assert_eq!(config.engine.find_distance, Some(18));
        assert!(config.scripting.enabled);
        assert_eq!(config.scripting.autostart, vec!["hello_world"]);
        assert!(!config.scripting.is_script_enabled("journal_alert"));
        assert!(config.scripting.is_script_enabled("hello_world"));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine\n").unwrap();
        assert!(matches!(
            UoScriptConfig::load_from(&path),
            Err(ConfigLoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = UoScriptConfig::default();
        config.engine.alias_history_limit = 3;
        config.save_to(&path).unwrap();

        let loaded = UoScriptConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine, config.engine);
    }
}
