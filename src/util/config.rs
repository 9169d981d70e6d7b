//! Configuration file support for rplite.
//!
//! rplite reads two configuration files:
//! - Global: `~/.rplite/config.toml` - User-wide defaults
//! - Project: `rplite.toml` at the project root - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scanner::ScanMode;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "rplite.toml";

/// rplite configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanner settings
    pub scan: ScanConfig,
}

/// Scanner settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source directory, relative to the project root
    pub src_dir: Option<PathBuf>,

    /// Extra ignore globs, relative to the project root
    pub ignore: Vec<String>,

    /// Manifest caching mode
    pub mode: Option<ScanMode>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Ignore patterns accumulate; the other settings are replaced.
    pub fn merge(&mut self, other: Config) {
        if other.scan.src_dir.is_some() {
            self.scan.src_dir = other.scan.src_dir;
        }
        if other.scan.mode.is_some() {
            self.scan.mode = other.scan.mode;
        }
        for pattern in other.scan.ignore {
            if !self.scan.ignore.contains(&pattern) {
                self.scan.ignore.push(pattern);
            }
        }
    }

    /// Source directory, defaulting to `src`.
    pub fn src_dir(&self) -> PathBuf {
        self.scan
            .src_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("src"))
    }

    pub fn mode(&self) -> ScanMode {
        self.scan.mode.unwrap_or_default()
    }
}

/// Get the global rplite config directory (~/.rplite).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rplite"))
}

/// Get the global config path (~/.rplite/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (rplite.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (rplite.toml)
/// 2. Global config (~/.rplite/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.src_dir(), PathBuf::from("src"));
        assert_eq!(config.mode(), ScanMode::Interactive);
        assert!(config.scan.ignore.is_empty());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(PROJECT_CONFIG_FILE);

        std::fs::write(
            &config_path,
            r#"
[scan]
src_dir = "app"
ignore = ["app/legacy/**"]
mode = "batch"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.src_dir(), PathBuf::from("app"));
        assert_eq!(config.scan.ignore, vec!["app/legacy/**".to_string()]);
        assert_eq!(config.mode(), ScanMode::Batch);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.scan.src_dir = Some(PathBuf::from("src"));
        base.scan.ignore = vec!["a/**".into()];
        base.scan.mode = Some(ScanMode::Batch);

        let mut project = Config::default();
        project.scan.src_dir = Some(PathBuf::from("lib"));
        project.scan.ignore = vec!["a/**".into(), "b/**".into()];

        base.merge(project);

        assert_eq!(base.src_dir(), PathBuf::from("lib"));
        assert_eq!(base.scan.ignore, vec!["a/**".to_string(), "b/**".to_string()]);
        assert_eq!(base.mode(), ScanMode::Batch); // Not overridden
    }

    #[test]
    fn test_malformed_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&config_path, "[scan\nsrc_dir = ").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&global, "[scan]\nmode = \"batch\"\nsrc_dir = \"g\"\n").unwrap();
        std::fs::write(&project, "[scan]\nsrc_dir = \"p\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.src_dir(), PathBuf::from("p"));
        assert_eq!(config.mode(), ScanMode::Batch);
    }
}
