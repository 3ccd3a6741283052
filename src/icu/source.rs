//! Materializing an ICU source tree under the dependencies directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::options::ICU_DEFAULT_LOCALES;
use crate::error::{ConfigureError, ConfigureResult};
use crate::util::diagnostic::{suggestions, Diagnostic, Warnings};
use crate::util::fs;
use crate::util::hash::HashAlgorithm;

use super::archive;
use super::fetch::file_name_from_url;
use super::{locale_set, IcuContext};

/// Where the ICU tree in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The pre-bundled small ICU, used in place.
    Canned,
    /// `--with-icu-source`: a directory, archive or URL.
    UserSupplied,
    /// The version-pinned archive from the bundled metadata.
    Downloaded,
    /// A tree left in place by an earlier run.
    Existing,
}

/// One entry of the version-pinned archive list.
#[derive(Debug, Clone, Deserialize)]
pub struct PinnedArchive {
    pub url: String,
    /// Expected digests keyed by algorithm name.
    #[serde(flatten)]
    pub hashes: BTreeMap<String, String>,
}

impl PinnedArchive {
    /// The strongest supported digest listed for this archive.
    pub fn expected_hash(&self) -> Option<(HashAlgorithm, &str)> {
        HashAlgorithm::ALL
            .iter()
            .find_map(|algo| self.hashes.get(algo.as_str()).map(|h| (*algo, h.as_str())))
    }
}

/// Pick or build the ICU source directory.
///
/// Order: the canned small ICU when nothing else was asked for, then a
/// user-supplied source, then whatever already sits in the working
/// directory, then the pinned download.
pub fn acquire(
    cx: &IcuContext<'_>,
    small: bool,
    warnings: &mut Warnings,
) -> ConfigureResult<(PathBuf, SourceKind)> {
    let layout = cx.layout;
    let icu_dir = layout.icu_dir();
    let canned = layout.canned_icu_dir();

    let mut source = cx.options.icu_source.clone();
    if small
        && locale_set(&cx.options.locales) == locale_set(ICU_DEFAULT_LOCALES)
        && source.is_none()
        && canned.is_dir()
    {
        tracing::info!("using canned ICU in {}", layout.display_rel(&canned));
        return Ok((canned, SourceKind::Canned));
    }

    if let Some(ref s) = source {
        if same_path(&layout.root.join(s), &icu_dir) {
            warnings.warn(format!("Ignoring redundant --with-icu-source={}", s));
            source = None;
        }
    }

    let mut kind = SourceKind::Existing;
    if let Some(ref s) = source {
        materialize_user_source(cx, s)?;
        kind = SourceKind::UserSupplied;
    }

    if !icu_dir.is_dir() {
        kind = SourceKind::Downloaded;
        let unpacked = match pinned_download(cx, warnings)? {
            Some(tarball) => match archive::unpack(&tarball, &layout.deps_dir) {
                Ok(()) => true,
                Err(e) => {
                    warnings.push(
                        Diagnostic::warning(format!("failed to unpack {}", tarball.display()))
                            .with_context(format!("{:#}", e))
                            .with_suggestion(suggestions::RETRY_DOWNLOAD),
                    );
                    false
                }
            },
            None => false,
        };
        if !unpacked {
            warnings.warn(format!(
                "Intl support didn't find ICU in {}",
                layout.display_rel(&icu_dir)
            ));
        }
    }

    if !icu_dir.is_dir() {
        return Err(ConfigureError::IcuSourceNotFound { path: icu_dir });
    }

    tracing::info!("using ICU in {}", layout.display_rel(&icu_dir));
    Ok((icu_dir, kind))
}

fn same_path(a: &Path, b: &Path) -> bool {
    fs::normalize_path(a) == fs::normalize_path(b)
}

/// Copy, unpack or download `--with-icu-source` into the working directory.
fn materialize_user_source(cx: &IcuContext<'_>, source: &str) -> ConfigureResult<()> {
    let layout = cx.layout;
    let icu_dir = layout.icu_dir();
    let local = layout.root.join(source);

    if icu_dir.is_dir() {
        tracing::info!("deleting old ICU source: {}", layout.display_rel(&icu_dir));
        fs::remove_dir_all_if_exists(&icu_dir)?;
    }

    if local.is_dir() {
        tracing::info!("{} -> {}", local.display(), layout.display_rel(&icu_dir));
        fs::copy_dir_all(&local, &icu_dir)?;
        return Ok(());
    }

    let tmp = layout.icu_tmp_dir();
    fs::remove_dir_all_if_exists(&tmp)?;
    fs::ensure_dir(&tmp)?;

    let fetched = if local.is_file() {
        archive::unpack(&local, &tmp)
    } else {
        let name = file_name_from_url(source)
            .or_else(|| source.rsplit('/').next().map(String::from))
            .unwrap_or_else(|| "icu-source.tgz".to_string());
        let dest = tmp.join(name);
        cx.fetcher
            .fetch(source, &dest)
            .and_then(|()| archive::unpack(&dest, &tmp))
    };
    if let Err(e) = fetched {
        fs::remove_dir_all_if_exists(&tmp)?;
        return Err(e.into());
    }

    let unpacked = tmp.join("icu");
    if unpacked.is_dir() {
        std::fs::rename(&unpacked, &icu_dir).with_context(|| {
            format!(
                "failed to move {} to {}",
                unpacked.display(),
                icu_dir.display()
            )
        })?;
        fs::remove_dir_all_if_exists(&tmp)?;
        Ok(())
    } else {
        fs::remove_dir_all_if_exists(&tmp)?;
        Err(ConfigureError::validation_with_hint(
            format!("--with-icu-source={} did not result in an \"icu\" dir", source),
            "point --with-icu-source at an icu4c source archive or its unpacked `icu` directory",
        ))
    }
}

/// Locate, fetch if allowed, and verify the pinned ICU archive.
///
/// Returns `None` when no verified archive is available; mismatches are
/// reported as warnings.
pub fn pinned_download(
    cx: &IcuContext<'_>,
    warnings: &mut Warnings,
) -> ConfigureResult<Option<PathBuf>> {
    let deps_file = cx.layout.icu_deps_file();
    let contents = fs::read_to_string(&deps_file)?;
    let archives: Vec<PinnedArchive> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", deps_file.display()))?;

    let download_dir = cx.layout.root.join(&cx.options.download_path);
    if !fs::is_writable_dir(&download_dir) {
        return Err(ConfigureError::validation_with_hint(
            format!(
                "cannot write to desired download path {}",
                download_dir.display()
            ),
            "either create it or verify permissions",
        ));
    }

    for pinned in &archives {
        let (algo, expected) =
            pinned
                .expected_hash()
                .ok_or_else(|| ConfigureError::Integrity {
                    subject: pinned.url.clone(),
                    detail: format!(
                        "{} may be incorrect; expected one of these keys: {}",
                        deps_file.display(),
                        HashAlgorithm::ALL.map(|a| a.as_str()).join(" ")
                    ),
                })?;

        let name = file_name_from_url(&pinned.url)
            .or_else(|| pinned.url.rsplit('/').next().map(String::from))
            .unwrap_or_default();
        let target = download_dir.join(&name);

        if target.is_file() {
            tracing::info!("re-using existing {}", target.display());
        } else if cx.options.downloads.icu {
            if let Err(e) = cx.fetcher.fetch(&pinned.url, &target) {
                warnings.push(
                    Diagnostic::warning(format!("failed to download {}", pinned.url))
                        .with_context(format!("{:#}", e)),
                );
                continue;
            }
        } else {
            tracing::debug!("ICU downloads disabled, not fetching {}", pinned.url);
            continue;
        }

        if !target.is_file() {
            continue;
        }

        tracing::info!("checking file integrity with {}", algo);
        let actual = algo.digest_file(&target)?;
        tracing::info!("{}: {}  {}", algo, actual, target.display());
        if actual == expected {
            return Ok(Some(target));
        }

        warnings.push(
            Diagnostic::warning(format!("Expected: {}      *MISMATCH*", expected))
                .with_context(format!("{}: {}", algo, actual)),
        );
        warnings.push(
            Diagnostic::warning(format!(
                "Corrupted archive? Delete {} to retry download",
                target.display()
            ))
            .with_suggestion(suggestions::RETRY_DOWNLOAD),
        );
    }

    Ok(None)
}
