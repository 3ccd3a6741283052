//! Configuration file support for preconf.
//!
//! Two optional configuration file locations are consulted:
//! - Global: `~/.preconf/config.toml` - User-wide defaults
//! - Project: `.preconf/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Environment
//! variables (CC, CXX, PKG_CONFIG) take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// preconf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain fallbacks
    pub toolchain: ToolchainSettings,

    /// Project layout overrides
    pub paths: PathsConfig,
}

/// Toolchain commands used when the environment does not name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler command (e.g., "clang" or "ccache gcc")
    pub cc: Option<String>,

    /// C++ compiler command
    pub cxx: Option<String>,

    /// Package-metadata query tool (e.g., "pkgconf")
    pub pkg_config: Option<String>,
}

/// Directory conventions of the host project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Bundled dependency directory (default: `deps`)
    pub deps_dir: Option<PathBuf>,

    /// ICU generator/metadata directory (default: `tools/icu`)
    pub icu_tools_dir: Option<PathBuf>,

    /// Where descriptor files are written (default: project root)
    pub out_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or broken.
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
    pub fn merge(&mut self, other: Config) {
        let tc = other.toolchain;
        if tc.cc.is_some() {
            self.toolchain.cc = tc.cc;
        }
        if tc.cxx.is_some() {
            self.toolchain.cxx = tc.cxx;
        }
        if tc.pkg_config.is_some() {
            self.toolchain.pkg_config = tc.pkg_config;
        }

        let paths = other.paths;
        if paths.deps_dir.is_some() {
            self.paths.deps_dir = paths.deps_dir;
        }
        if paths.icu_tools_dir.is_some() {
            self.paths.icu_tools_dir = paths.icu_tools_dir;
        }
        if paths.out_dir.is_some() {
            self.paths.out_dir = paths.out_dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.preconf/config.toml)
/// 2. Global config (~/.preconf/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global preconf config directory (~/.preconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".preconf"))
}

/// Get the global config path (~/.preconf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.preconf/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".preconf").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[toolchain]\ncc = \"clang\"\npkg_config = \"pkgconf\"\n",
        )
        .unwrap();
        std::fs::write(
            &project,
            "[toolchain]\ncc = \"gcc-12\"\n\n[paths]\ndeps_dir = \"third_party\"\n",
        )
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.toolchain.cc.as_deref(), Some("gcc-12"));
        assert_eq!(config.toolchain.pkg_config.as_deref(), Some("pkgconf"));
        assert_eq!(
            config.paths.deps_dir.as_deref(),
            Some(Path::new("third_party"))
        );
    }

    #[test]
    fn test_broken_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("config.toml");
        std::fs::write(&project, "[toolchain\ncc = ").unwrap();

        let config = load_config(None, &project);
        assert!(config.toolchain.cc.is_none());
    }
}
