//! Unpacking ICU source archives.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Archive formats configure can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveKind {
    /// Detect the format from the file name.
    pub fn from_path(path: &Path) -> Result<ArchiveKind> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Ok(ArchiveKind::Tar)
        } else if name.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else {
            bail!("unrecognized archive type: {}", path.display())
        }
    }
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
///
/// Entries that would land outside `dest` are rejected.
pub fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    let kind = ArchiveKind::from_path(archive)?;
    let file =
        File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?;

    tracing::info!("unpacking {} into {}", archive.display(), dest.display());

    match kind {
        ArchiveKind::TarGz => extract_tar(flate2::read::GzDecoder::new(file), dest),
        ArchiveKind::Tar => extract_tar(file, dest),
        ArchiveKind::Zip => extract_zip(file, dest),
    }
    .with_context(|| format!("failed to unpack {}", archive.display()))
}

fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut archive = tar::Archive::new(reader);
    let mut count = 0usize;
    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry
            .path()
            .context("failed to get entry path")?
            .to_string_lossy()
            .into_owned();

        match entry.header().entry_type() {
            tar::EntryType::Regular
            | tar::EntryType::Continuous
            | tar::EntryType::Directory
            | tar::EntryType::Symlink
            | tar::EntryType::Link => {
                let unpacked = entry
                    .unpack_in(dest)
                    .with_context(|| format!("failed to extract {}", entry_path))?;
                if !unpacked {
                    bail!("tarball entry escapes destination directory: {}", entry_path);
                }
                count += 1;
            }
            other => {
                tracing::debug!("skipping unsupported entry type {:?}: {}", other, entry_path);
            }
        }
    }

    tracing::debug!("extracted {} entries", count);
    Ok(())
}

fn extract_zip(file: File, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut archive = zip::ZipArchive::new(file).context("Corrupted ZIP?")?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("failed to read zip entry {}", i))?;
        let relative = match entry.enclosed_name() {
            Some(p) => p,
            None => bail!("zip entry escapes destination directory: {}", entry.name()),
        };
        let out = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut target =
            File::create(&out).with_context(|| format!("failed to create {}", out.display()))?;
        std::io::copy(&mut entry, &mut target)
            .with_context(|| format!("failed to extract {}", entry.name()))?;
    }

    tracing::debug!("extracted {} entries", archive.len());
    Ok(())
}
