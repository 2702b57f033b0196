use std::path::PathBuf;

use directories::BaseDirs;

/// Per-user directories for an application.
///
/// Unix-like systems follow the XDG base directory layout:
/// - config: `$XDG_CONFIG_HOME/{name}` or `~/.config/{name}`
/// - data: `$XDG_DATA_HOME/{name}` or `~/.local/share/{name}`
///
/// Windows uses `%APPDATA%\{name}` for both.
pub struct ProjectPaths {
    name: String,
    home: PathBuf,
}

impl ProjectPaths {
    /// None when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        let home = BaseDirs::new()?.home_dir().to_path_buf();
        Some(Self {
            name: name.to_string(),
            home,
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base("XDG_CONFIG_HOME", &[".config"]).join(&self.name)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base("XDG_DATA_HOME", &[".local", "share"]).join(&self.name)
    }

    #[cfg(not(target_os = "windows"))]
    fn base(&self, var: &str, fallback: &[&str]) -> PathBuf {
        std::env::var_os(var)
            .map(PathBuf::from)
            .filter(|path| path.is_absolute())
            .unwrap_or_else(|| fallback.iter().fold(self.home.clone(), |p, s| p.join(s)))
    }

    #[cfg(target_os = "windows")]
    fn base(&self, _var: &str, _fallback: &[&str]) -> PathBuf {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.home.join("AppData").join("Roaming"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_end_with_name() {
        if let Some(paths) = ProjectPaths::new("uoscript") {
            assert!(paths.config_dir().ends_with("uoscript"));
            assert!(paths.data_dir().ends_with("uoscript"));
        }
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_fallback_under_home() {
        let paths = ProjectPaths {
            name: "uoscript".to_string(),
            home: PathBuf::from("/home/tester"),
        };
        let fallback = paths.base("UOSCRIPT_TEST_UNSET_VAR", &[".local", "share"]);
        assert_eq!(fallback, PathBuf::from("/home/tester/.local/share"));
    }
}
