//! Implementation of `preconf configure`.
//!
//! Probes the host toolchain, resolves every feature and writes the
//! descriptor and the ICU sidecar. Nothing is written unless resolution
//! succeeds.

use std::path::{Path, PathBuf};

use crate::core::host::HostEnv;
use crate::core::layout::ProjectLayout;
use crate::core::options::Options;
use crate::error::ConfigureResult;
use crate::icu::{Fetcher, HttpFetcher, IcuVersions};
use crate::probe::{probe_toolchain, CapabilityProbe};
use crate::resolve::{self, PackageQuery, PkgConfig, Resolution, ResolveCx};
use crate::util::config::{global_config_path, load_config, project_config_path};
use crate::util::diagnostic::Warnings;
use crate::util::fs;

/// Descriptor file name.
pub const CONFIG_FILE: &str = "config.json";
/// ICU sidecar file name.
pub const ICU_CONFIG_FILE: &str = "icu_config.json";

/// Options for the configure command.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Root of the project being configured.
    pub root: PathBuf,

    /// Resolved user intent.
    pub options: Options,

    /// Output directory override (wins over `[paths] out_dir`).
    pub out_dir: Option<PathBuf>,

    /// Draw a progress bar for downloads.
    pub show_progress: bool,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct ConfigureReport {
    pub resolution: Resolution,
    pub warnings: Warnings,
    /// Files written, descriptor first.
    pub written: Vec<PathBuf>,
}

/// The external tools a run talks to.
pub struct Collaborators<'a> {
    pub probe: &'a mut CapabilityProbe,
    pub packages: &'a dyn PackageQuery,
    pub fetcher: &'a dyn Fetcher,
}

/// Run configure against the real host.
pub fn configure(opts: &ConfigureOptions) -> ConfigureResult<ConfigureReport> {
    let root = fs::normalize_path(&opts.root);
    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    let host = HostEnv::from_env(&config.toolchain);
    let mut layout = ProjectLayout::new(&root).with_overrides(&config.paths);
    if let Some(ref out) = opts.out_dir {
        layout.out_dir = root.join(out);
    }

    let mut probe = CapabilityProbe::host();
    let packages = PkgConfig::new(host.pkg_config.clone());
    let fetcher = HttpFetcher::new(opts.show_progress);

    configure_with(
        &opts.options,
        &host,
        &layout,
        Collaborators {
            probe: &mut probe,
            packages: &packages,
            fetcher: &fetcher,
        },
    )
}

/// Run configure with explicit collaborators.
pub fn configure_with(
    options: &Options,
    host: &HostEnv,
    layout: &ProjectLayout,
    tools: Collaborators<'_>,
) -> ConfigureResult<ConfigureReport> {
    let mut warnings = Warnings::new();
    let resolution = resolve_all(options, host, layout, tools, &mut warnings)?;
    let written = write_outputs(layout, &resolution)?;

    Ok(ConfigureReport {
        resolution,
        warnings,
        written,
    })
}

/// Probe and resolve without touching the output directory.
pub fn resolve_all(
    options: &Options,
    host: &HostEnv,
    layout: &ProjectLayout,
    tools: Collaborators<'_>,
    warnings: &mut Warnings,
) -> ConfigureResult<Resolution> {
    resolve::validate_options(options)?;

    let minimum_icu = IcuVersions::load(&layout.icu_versions_file())?.minimum_icu;
    let facts = probe_toolchain(tools.probe, options, host, warnings)?;

    let cx = ResolveCx {
        options,
        host,
        facts: &facts,
        layout,
        packages: tools.packages,
        fetcher: tools.fetcher,
        minimum_icu,
    };
    resolve::resolve(&cx, warnings)
}

/// Write the descriptor and the ICU sidecar into `layout.out_dir`.
pub fn write_outputs(layout: &ProjectLayout, resolution: &Resolution) -> ConfigureResult<Vec<PathBuf>> {
    fs::ensure_dir(&layout.out_dir)?;

    let config = layout.out_dir.join(CONFIG_FILE);
    let icu_config = layout.out_dir.join(ICU_CONFIG_FILE);
    write_json(&config, resolution.descriptor.to_json())?;
    write_json(&icu_config, resolution.icu_config.to_json())?;

    Ok(vec![config, icu_config])
}

fn write_json(path: &Path, json: serde_json::Result<String>) -> ConfigureResult<()> {
    let json = json.map_err(anyhow::Error::from)?;
    tracing::info!("creating {}", path.display());
    fs::write_string(path, &json)?;
    Ok(())
}
