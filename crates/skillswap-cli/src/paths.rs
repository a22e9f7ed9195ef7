//! Platform directories for skillswap
//!
//! Data, configuration and the SQLite database default to the platform's
//! conventional locations (XDG on Linux) and can be overridden from the
//! config file, environment variables or command line flags.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "skillswap";
const APP_NAME: &str = "skillswap";

#[derive(Debug, Clone)]
pub struct SwapPaths {
    /// Root data directory
    pub data_dir: PathBuf,

    pub config_dir: PathBuf,

    /// SQLite database holding profiles and swap requests
    pub database_path: PathBuf,

    /// Seed fixtures loaded by `skillswap seed`
    pub fixtures_path: PathBuf,
}

impl SwapPaths {
    /// System defaults
    ///
    /// - Linux: ~/.local/share/skillswap, ~/.config/skillswap
    /// - macOS: ~/Library/Application Support/org.skillswap.skillswap
    /// - Windows: %APPDATA%\skillswap\skillswap
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .context("Failed to determine system directories")?;

        let data_dir = project_dirs.data_dir().to_path_buf();
        let config_dir = project_dirs.config_dir().to_path_buf();

        Ok(Self {
            database_path: data_dir.join("skillswap.db"),
            fixtures_path: PathBuf::from("fixtures").join("seed.yaml"),
            data_dir,
            config_dir,
        })
    }

    /// Everything under one root directory
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();

        Self {
            data_dir: root.clone(),
            config_dir: root.join("config"),
            database_path: root.join("skillswap.db"),
            fixtures_path: root.join("seed.yaml"),
        }
    }

    /// Safe to call repeatedly
    pub fn ensure_directories(&self) -> Result<()> {
        let mut dirs = vec![self.data_dir.clone(), self.config_dir.clone()];
        if let Some(parent) = self.database_path.parent() {
            dirs.push(parent.to_path_buf());
        }

        for dir in dirs.iter().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }

        Ok(())
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join("config.yaml")
    }

    pub fn display(&self) -> String {
        format!(
            "Skillswap paths:
  Data directory:    {}
  Config directory:  {}
  Database:          {}
  Seed fixtures:     {}",
            self.data_dir.display(),
            self.config_dir.display(),
            self.database_path.display(),
            self.fixtures_path.display()
        )
    }
}

/// Path overrides from config or environment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures_path: Option<PathBuf>,
}

impl PathsConfig {
    /// A new data directory also moves the database unless one is given
    pub fn apply_to(&self, mut paths: SwapPaths) -> SwapPaths {
        if let Some(ref data_dir) = self.data_dir {
            paths.database_path = data_dir.join("skillswap.db");
            paths.data_dir = data_dir.clone();
        }
        if let Some(ref config_dir) = self.config_dir {
            paths.config_dir = config_dir.clone();
        }
        if let Some(ref database_path) = self.database_path {
            paths.database_path = database_path.clone();
        }
        if let Some(ref fixtures_path) = self.fixtures_path {
            paths.fixtures_path = fixtures_path.clone();
        }
        paths
    }
}

/// Overrides from
/// - SKILLSWAP_DATA_DIR
/// - SKILLSWAP_CONFIG_DIR
/// - SKILLSWAP_DATABASE_PATH
/// - SKILLSWAP_FIXTURES_PATH
pub fn paths_from_env() -> PathsConfig {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty()).map(PathBuf::from);
    PathsConfig {
        data_dir: var("SKILLSWAP_DATA_DIR"),
        config_dir: var("SKILLSWAP_CONFIG_DIR"),
        database_path: var("SKILLSWAP_DATABASE_PATH"),
        fixtures_path: var("SKILLSWAP_FIXTURES_PATH"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_system_paths() {
        let paths = SwapPaths::new().expect("Should create system paths");

        assert!(!paths.data_dir.as_os_str().is_empty());
        assert!(!paths.config_dir.as_os_str().is_empty());
        assert!(paths.database_path.ends_with("skillswap.db"));
        assert!(paths.default_config_file().ends_with("config.yaml"));
    }

    #[test]
    fn test_custom_root() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SwapPaths::with_root(temp_dir.path());

        assert_eq!(paths.data_dir, temp_dir.path());
        assert_eq!(paths.config_dir, temp_dir.path().join("config"));
        assert_eq!(paths.database_path, temp_dir.path().join("skillswap.db"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SwapPaths::with_root(temp_dir.path().join("nested"));

        paths
            .ensure_directories()
            .expect("Should create directories");

        assert!(paths.data_dir.exists());
        assert!(paths.config_dir.exists());
    }

    #[test]
    fn test_data_dir_override_moves_database() {
        let temp_dir = TempDir::new().unwrap();
        let config = PathsConfig {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let paths = config.apply_to(SwapPaths::with_root("/unused"));
        assert_eq!(paths.database_path, temp_dir.path().join("skillswap.db"));
    }

    #[test]
    fn test_explicit_database_wins_over_data_dir() {
        let config = PathsConfig {
            data_dir: Some(PathBuf::from("/data")),
            database_path: Some(PathBuf::from("/elsewhere/swap.db")),
            ..Default::default()
        };

        let paths = config.apply_to(SwapPaths::with_root("/unused"));
        assert_eq!(paths.data_dir, PathBuf::from("/data"));
        assert_eq!(paths.database_path, PathBuf::from("/elsewhere/swap.db"));
    }

    #[test]
    fn test_display() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SwapPaths::with_root(temp_dir.path());

        let display = paths.display();
        assert!(display.contains("Database"));
        assert!(display.contains(temp_dir.path().to_str().unwrap()));
    }
}
