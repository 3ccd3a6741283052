//! Downloading ICU archives.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::NamedTempFile;
use url::Url;

/// Retrieves a URL into a local file.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP fetcher with a progress bar.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new(show_progress: bool) -> Self {
        HttpFetcher { show_progress }
    }

    fn progress_bar(&self, total: Option<u64>, url: &str) -> Option<ProgressBar> {
        let total = total.filter(|t| *t > 0 && self.show_progress)?;
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(file_name_from_url(url).unwrap_or_else(|| url.to_string()));
        Some(pb)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("fetching {}", url);

        let mut response = reqwest::blocking::get(url)
            .with_context(|| format!("failed to download {}", url))?;
        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }

        let progress = self.progress_bar(response.content_length(), url);
        let written = write_atomically(dest, |file| {
            let n = match progress {
                Some(ref pb) => {
                    let mut writer = pb.wrap_write(BufWriter::new(file));
                    let n = response
                        .copy_to(&mut writer)
                        .with_context(|| format!("failed to read response body from {}", url))?;
                    writer.flush()?;
                    n
                }
                None => {
                    let mut writer = BufWriter::new(file);
                    let n = response
                        .copy_to(&mut writer)
                        .with_context(|| format!("failed to read response body from {}", url))?;
                    writer.flush()?;
                    n
                }
            };
            Ok(n)
        });
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        let written = written?;

        tracing::info!("downloaded {} bytes to {}", written, dest.display());
        Ok(())
    }
}

/// Write `dest` through a temporary file in the same directory.
///
/// `dest` only appears once `write` succeeds; a failed write leaves nothing
/// behind.
pub fn write_atomically<F>(dest: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<u64>,
{
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory: {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    let written = write(tmp.as_file_mut())?;
    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    Ok(written)
}

/// Last path segment of a URL, if it has one.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(String::from)
}

/// Whether `source` looks like something to download rather than a local
/// path.
pub fn is_url(source: &str) -> bool {
    Url::parse(source).is_ok_and(|u| matches!(u.scheme(), "http" | "https" | "ftp" | "file"))
}
