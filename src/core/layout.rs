//! Directory conventions of the project being configured.

use std::path::{Path, PathBuf};

use crate::util::config::PathsConfig;

/// Where bundled dependencies, ICU tooling and outputs live.
///
/// All paths are relative to `root` unless an override made them absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub deps_dir: PathBuf,
    pub icu_tools_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl ProjectLayout {
    /// The default layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        ProjectLayout {
            deps_dir: root.join("deps"),
            icu_tools_dir: root.join("tools").join("icu"),
            out_dir: root.clone(),
            root,
        }
    }

    /// Apply `[paths]` overrides from the config file.
    pub fn with_overrides(mut self, paths: &PathsConfig) -> Self {
        if let Some(ref deps) = paths.deps_dir {
            self.deps_dir = self.root.join(deps);
        }
        if let Some(ref tools) = paths.icu_tools_dir {
            self.icu_tools_dir = self.root.join(tools);
        }
        if let Some(ref out) = paths.out_dir {
            self.out_dir = self.root.join(out);
        }
        self
    }

    /// Working ICU source directory (`deps/icu`).
    pub fn icu_dir(&self) -> PathBuf {
        self.deps_dir.join("icu")
    }

    /// Pre-bundled small ICU (`deps/icu-small`).
    pub fn canned_icu_dir(&self) -> PathBuf {
        self.deps_dir.join("icu-small")
    }

    /// Scratch area for unpacking ICU archives (`deps/icu-tmp`).
    pub fn icu_tmp_dir(&self) -> PathBuf {
        self.deps_dir.join("icu-tmp")
    }

    /// `{"minimum_icu": N}`.
    pub fn icu_versions_file(&self) -> PathBuf {
        self.icu_tools_dir.join("icu_versions.json")
    }

    /// Version-pinned ICU archive list with expected hashes.
    pub fn icu_deps_file(&self) -> PathBuf {
        self.icu_tools_dir.join("current_ver.dep")
    }

    /// Generator file for a bundled ICU tree.
    pub fn icu_generic_gyp(&self) -> PathBuf {
        self.icu_tools_dir.join("icu-generic.gyp")
    }

    /// Generator file for a system ICU.
    pub fn icu_system_gyp(&self) -> PathBuf {
        self.icu_tools_dir.join("icu-system.gyp")
    }

    /// Render `path` relative to the project root with `/` separators.
    pub fn display_rel(&self, path: &Path) -> String {
        crate::util::fs::relative_path(&self.root, path)
    }
}
