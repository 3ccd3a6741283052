//! Reading an ICU source tree: version, data file and module sources.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::core::arch::Endianness;
use crate::error::{ConfigureError, ConfigureResult};
use crate::util::fs::relative_path;

static VERSION_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#define\s+U_ICU_VERSION_SHORT\s+"([^"]*)".*"#).unwrap()
});

/// ICU modules built from source, mapped to their directory under
/// `source/`.
pub const MODULES: [(&str, &str); 7] = [
    ("stubdata", "stubdata"),
    ("common", "common"),
    ("i18n", "i18n"),
    ("tools", "tools/toolutil"),
    ("genccode", "tools/genccode"),
    ("genrb", "tools/genrb"),
    ("icupkg", "tools/icupkg"),
];

/// The header carrying `U_ICU_VERSION_SHORT`.
pub fn uvernum_path(icu_dir: &Path) -> PathBuf {
    icu_dir
        .join("source")
        .join("common")
        .join("unicode")
        .join("uvernum.h")
}

/// Major version of the tree at `icu_dir`. The last matching line wins.
pub fn read_major_version(icu_dir: &Path) -> ConfigureResult<u32> {
    let header = uvernum_path(icu_dir);
    let contents = std::fs::read_to_string(&header).map_err(|_| ConfigureError::MissingIcuData {
        message: format!("could not load {} - is ICU installed?", header.display()),
        path: header.clone(),
    })?;

    let short = contents
        .lines()
        .filter_map(|line| VERSION_SHORT.captures(line))
        .map(|caps| caps[1].to_string())
        .last();

    short
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| ConfigureError::MissingIcuData {
            message: format!(
                "could not read U_ICU_VERSION_SHORT version from {}",
                header.display()
            ),
            path: header,
        })
}

/// The prebuilt data file chosen for a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub path: PathBuf,
    pub endianness: Endianness,
}

/// Prefer the little-endian `icudt<major>l.dat`; fall back to the host's
/// byte order when that is big-endian.
pub fn select_data_file(
    icu_dir: &Path,
    major: u32,
    host: Endianness,
) -> ConfigureResult<DataFile> {
    let data_in = icu_dir.join("source").join("data").join("in");
    let little = data_in.join(format!("icudt{}l.dat", major));
    if little.is_file() {
        return Ok(DataFile {
            path: little,
            endianness: Endianness::Little,
        });
    }

    if host != Endianness::Little {
        let native = data_in.join(format!("icudt{}{}.dat", major, host.letter()));
        if native.is_file() {
            return Ok(DataFile {
                path: native,
                endianness: host,
            });
        }
    }

    Err(ConfigureError::MissingIcuData {
        message: format!("ICU prebuilt data file {} does not exist", little.display()),
        path: little,
    })
}

/// Source files of one module relative to `tools_dir`, sorted.
///
/// A file with a counterpart under `tools_dir/patches/<major>/source/<sub>/`
/// is replaced by the patched copy.
pub fn module_sources(icu_dir: &Path, tools_dir: &Path, sub: &str, major: u32) -> Vec<String> {
    let dir = icu_dir.join("source").join(sub);
    let patch_dir = tools_dir
        .join("patches")
        .join(major.to_string())
        .join("source")
        .join(sub);

    let mut files: Vec<String> = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "c" | "cpp" | "h"))
        })
        .map(|e| {
            let patched = patch_dir.join(e.file_name());
            if patched.is_file() {
                tracing::info!("using floating patch {}", patched.display());
                relative_path(tools_dir, &patched)
            } else {
                relative_path(tools_dir, e.path())
            }
        })
        .collect();

    files.sort();
    files
}
