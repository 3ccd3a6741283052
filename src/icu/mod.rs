//! Internationalization: where ICU comes from and what the build needs to
//! know about it.
//!
//! [`resolve_intl`] walks the Intl mode, acquires a source tree when one
//! is needed (see [`source::acquire`]), reads its version and data file,
//! and produces both the descriptor fragment and the `icu_config.json`
//! sidecar.

pub mod archive;
pub mod data;
pub mod fetch;
pub mod source;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::arch::Endianness;
use crate::core::descriptor::{Fragment, IcuConfig};
use crate::core::layout::ProjectLayout;
use crate::core::options::{IntlMode, IntlOptions};
use crate::error::{ConfigureError, ConfigureResult};
use crate::resolve::PackageQuery;
use crate::util::diagnostic::{suggestions, Warnings};
use crate::util::fs;

pub use fetch::{Fetcher, HttpFetcher};
pub use source::SourceKind as IcuSourceKind;

/// pkg-config name of the system ICU.
pub const SYSTEM_ICU_PACKAGE: &str = "icu-i18n";

/// Minimum ICU major version used when `icu_versions.json` is absent.
pub const DEFAULT_MINIMUM_ICU: u32 = 64;

/// `icu_versions.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IcuVersions {
    pub minimum_icu: u32,
}

impl Default for IcuVersions {
    fn default() -> Self {
        IcuVersions {
            minimum_icu: DEFAULT_MINIMUM_ICU,
        }
    }
}

impl IcuVersions {
    /// Load the version floor, falling back to the default when the file
    /// does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("{} not found, minimum ICU is {}", path.display(), DEFAULT_MINIMUM_ICU);
            return Ok(IcuVersions::default());
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// What ICU resolution may look at.
pub struct IcuContext<'a> {
    pub options: &'a IntlOptions,
    pub layout: &'a ProjectLayout,
    pub packages: &'a dyn PackageQuery,
    pub fetcher: &'a dyn Fetcher,
    /// Byte order of the build host.
    pub endianness: Endianness,
    pub minimum_icu: u32,
}

/// The ICU tree a bundled-ICU build will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcuSource {
    pub kind: IcuSourceKind,
    pub path: PathBuf,
    pub major: u32,
    /// Byte order of the selected data file.
    pub endianness: Endianness,
    pub data_file: PathBuf,
    /// Always contains `root`.
    pub locales: BTreeSet<String>,
}

/// Result of Intl resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IcuOutcome {
    pub fragment: Fragment,
    pub sidecar: IcuConfig,
    /// `None` unless a bundled ICU tree is used.
    pub source: Option<IcuSource>,
}

/// The requested locales plus `root`, deduplicated.
pub fn locale_set(locales: &str) -> BTreeSet<String> {
    let mut set: BTreeSet<String> = locales
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    set.insert("root".to_string());
    set
}

/// Resolve Intl support.
pub fn resolve_intl(cx: &IcuContext<'_>, warnings: &mut Warnings) -> ConfigureResult<IcuOutcome> {
    let options = cx.options;
    let mut out = IcuOutcome::default();

    if let Some(ref gyp) = options.icu_path {
        if options.mode.is_some_and(|m| m != IntlMode::SmallIcu) {
            return Err(ConfigureError::validation(
                "cannot specify both --with-icu-path and --with-intl",
            ));
        }
        out.fragment.set("icu_small", false);
        out.fragment.set("enable_i18n_support", true);
        out.fragment.set("icu_gyp_path", fs::to_slash(gyp));
        return Ok(out);
    }

    let mode = options.effective_mode();
    let small = mode == IntlMode::SmallIcu;
    out.fragment.set("icu_small", small);

    match mode {
        IntlMode::None => {
            out.fragment.set("enable_i18n_support", false);
            return Ok(out);
        }
        IntlMode::SystemIcu => {
            out.fragment.set("enable_i18n_support", true);
            resolve_system_icu(cx, &mut out.fragment)?;
            return Ok(out);
        }
        IntlMode::SmallIcu | IntlMode::FullIcu => {
            out.fragment.set("enable_i18n_support", true);
        }
    }

    let locales = locale_set(&options.locales);
    if small {
        let joined: Vec<&str> = locales.iter().map(String::as_str).collect();
        out.fragment.set("icu_locales", joined.join(","));
    }

    let (path, kind) = source::acquire(cx, small, warnings)?;
    if kind == IcuSourceKind::Canned {
        out.sidecar.set_small_canned();
    }

    let layout = cx.layout;
    out.fragment
        .set("icu_gyp_path", layout.display_rel(&layout.icu_generic_gyp()));
    out.fragment.set("icu_path", layout.display_rel(&path));

    let major = data::read_major_version(&path)?;
    if major < cx.minimum_icu {
        return Err(ConfigureError::Version {
            component: "icu4c".to_string(),
            found: format!("{}.x", major),
            required: cx.minimum_icu,
        });
    }

    let data_file = data::select_data_file(&path, major, cx.endianness)?;
    out.fragment.set("icu_ver_major", major.to_string());
    out.fragment
        .set("icu_endianness", cx.endianness.letter().to_string());
    out.fragment.set(
        "icu_data_in",
        fs::relative_path(&layout.icu_tools_dir, &data_file.path),
    );

    for (module, sub) in data::MODULES {
        let files = data::module_sources(&path, &layout.icu_tools_dir, sub, major);
        out.sidecar.set_sources(module, files);
    }

    tracing::debug!(
        "ICU {} from {} ({:?}), data {}",
        major,
        layout.display_rel(&path),
        kind,
        data_file.path.display()
    );

    out.source = Some(IcuSource {
        kind,
        path,
        major,
        endianness: data_file.endianness,
        data_file: data_file.path,
        locales,
    });
    Ok(out)
}

fn resolve_system_icu(cx: &IcuContext<'_>, out: &mut Fragment) -> ConfigureResult<()> {
    let info = cx.packages.query(SYSTEM_ICU_PACKAGE);
    let (Some(version), Some(major)) = (info.version.clone(), info.major_version()) else {
        return Err(ConfigureError::validation_with_hint(
            format!("could not load pkg-config data for \"{}\"", SYSTEM_ICU_PACKAGE),
            suggestions::DISABLE_INTL,
        ));
    };

    out.set("icu_ver_major", major.to_string());
    if major < cx.minimum_icu {
        return Err(ConfigureError::Version {
            component: "icu4c".to_string(),
            found: version,
            required: cx.minimum_icu,
        });
    }

    // The path flag may contain spaces, so it stays one entry.
    if let Some(libpath) = info.libpath.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        out.library(libpath);
    }
    for flag in info.lib_flags() {
        out.library(flag);
    }
    for dir in info.include_dirs() {
        out.include_dir(dir);
    }
    out.set(
        "icu_gyp_path",
        cx.layout.display_rel(&cx.layout.icu_system_gyp()),
    );
    Ok(())
}
