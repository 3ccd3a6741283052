//! Feature resolution: turns options plus probed facts into a descriptor.
//!
//! Resolution is split into resolvers that each return a [`Fragment`]. The
//! fragments are merged by [`assemble`] in a fixed order, so the descriptor
//! is a pure function of the options, the probed facts and the filesystem.

pub mod assemble;
pub mod features;
pub mod pkg_config;
pub mod shared;
pub mod tls;

use crate::core::arch::{normalize_arch, Os};
use crate::core::descriptor::{ConfigDescriptor, IcuConfig};
use crate::core::host::HostEnv;
use crate::core::layout::ProjectLayout;
use crate::core::options::{Dependency, IntlMode, Options};
use crate::error::{ConfigureError, ConfigureResult};
use crate::icu::{self, Fetcher, IcuContext};
use crate::probe::ToolchainFacts;
use crate::util::diagnostic::Warnings;

pub use assemble::Fragments;
pub use pkg_config::{PackageInfo, PackageQuery, PkgConfig};
pub use shared::{resolve_dependency, DependencySpec};

/// Everything a resolver may look at. Nothing in here changes during a run.
pub struct ResolveCx<'a> {
    pub options: &'a Options,
    pub host: &'a HostEnv,
    pub facts: &'a ToolchainFacts,
    pub layout: &'a ProjectLayout,
    pub packages: &'a dyn PackageQuery,
    pub fetcher: &'a dyn Fetcher,
    /// Lowest supported ICU major version.
    pub minimum_icu: u32,
}

impl<'a> ResolveCx<'a> {
    /// Target platform: `--dest-os`, else the host.
    pub fn flavor(&self) -> Os {
        self.options.dest_os.unwrap_or(self.host.os)
    }

    /// Canonical host architecture name.
    pub fn host_arch(&self) -> &'static str {
        self.facts.host_arch.as_str()
    }

    /// Canonical target architecture name: `--dest-cpu` after alias
    /// normalization, else the host architecture.
    pub fn target_arch(&self) -> &str {
        match self.options.dest_cpu.as_deref() {
            Some(cpu) => normalize_arch(cpu),
            None => self.host_arch(),
        }
    }

    /// `--cross-compiling` when given, else whether target and host differ.
    pub fn cross_compiling(&self) -> bool {
        self.options
            .cross_compiling
            .unwrap_or_else(|| self.target_arch() != self.host_arch())
    }
}

/// The resolved descriptor and ICU sidecar.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub descriptor: ConfigDescriptor,
    pub icu_config: IcuConfig,
}

/// Reject option combinations that conflict regardless of the host.
///
/// Runs before anything is probed or resolved.
pub fn validate_options(options: &Options) -> ConfigureResult<()> {
    let tls = &options.tls;
    if tls.without_ssl {
        let conflicting = [
            (options.shared_libs.openssl.shared, "--shared-openssl"),
            (tls.no_asm, "--openssl-no-asm"),
            (tls.fips.is_some(), "--openssl-fips"),
        ];
        if let Some((_, flag)) = conflicting.iter().find(|(set, _)| *set) {
            return Err(ConfigureError::validation(format!(
                "--without-ssl is incompatible with {}",
                flag
            )));
        }
    }

    if options.profiling.pgo_generate && options.profiling.pgo_use {
        return Err(ConfigureError::validation_with_hint(
            "only one of --enable-pgo-generate or --enable-pgo-use can be specified at a time",
            "build with --enable-pgo-generate first, profile, then rebuild with --enable-pgo-use",
        ));
    }

    let intl = &options.intl;
    if intl.icu_path.is_some() && intl.mode.is_some_and(|m| m != IntlMode::SmallIcu) {
        return Err(ConfigureError::validation(
            "cannot specify both --with-icu-path and --with-intl",
        ));
    }

    if tls.no_asm && options.shared_libs.openssl.shared {
        return Err(ConfigureError::validation(
            "--openssl-no-asm is incompatible with --shared-openssl",
        ));
    }

    if tls.fips.is_some() {
        return Err(ConfigureError::validation_with_hint(
            "FIPS is not supported in this version",
            "drop --openssl-fips; --openssl-is-fips only marks the linked library",
        ));
    }

    Ok(())
}

/// Run every resolver and assemble the descriptor.
pub fn resolve(cx: &ResolveCx<'_>, warnings: &mut Warnings) -> ConfigureResult<Resolution> {
    validate_options(cx.options)?;

    let toolchain = features::resolve_toolchain(cx)?;

    let shared = Dependency::PLAIN
        .iter()
        .map(|&dep| {
            resolve_dependency(dep, cx.options.shared_libs.get(dep), cx.packages, cx.flavor())
                .to_fragment()
        })
        .collect();

    let tls = tls::resolve_tls(cx, warnings)?;

    let icu_cx = IcuContext {
        options: &cx.options.intl,
        layout: cx.layout,
        packages: cx.packages,
        fetcher: cx.fetcher,
        endianness: cx.host.endianness,
        minimum_icu: cx.minimum_icu,
    };
    let intl = icu::resolve_intl(&icu_cx, warnings)?;

    let fragments = Fragments {
        toolchain,
        shared,
        tls,
        intl: intl.fragment,
        static_linking: features::resolve_static_linking(cx, warnings),
        inspector: features::resolve_inspector(cx.options),
    };

    Ok(Resolution {
        descriptor: fragments.assemble(),
        icu_config: intl.sidecar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arch::Arch;
    use crate::test_support::{facts_for, host_env, FakeFetcher, FakePackages};

    #[test]
    fn test_without_ssl_conflicts() {
        let mut options = Options::default();
        options.tls.without_ssl = true;
        options.shared_libs.openssl.shared = true;
        let err = validate_options(&options).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("--shared-openssl"));

        let mut options = Options::default();
        options.tls.without_ssl = true;
        options.tls.no_asm = true;
        assert!(validate_options(&options)
            .unwrap_err()
            .to_string()
            .contains("--openssl-no-asm"));

        let mut options = Options::default();
        options.tls.without_ssl = true;
        options.tls.fips = Some("/opt/fips".to_string());
        assert!(validate_options(&options)
            .unwrap_err()
            .to_string()
            .contains("--openssl-fips"));
    }

    #[test]
    fn test_pgo_modes_are_exclusive() {
        let mut options = Options::default();
        options.profiling.pgo_generate = true;
        options.profiling.pgo_use = true;
        assert!(validate_options(&options).unwrap_err().is_validation());
    }

    #[test]
    fn test_icu_path_with_explicit_mode() {
        let mut options = Options::default();
        options.intl.icu_path = Some("/opt/icu/icu.gyp".into());
        assert!(validate_options(&options).is_ok());

        options.intl.mode = Some(IntlMode::SmallIcu);
        assert!(validate_options(&options).is_ok());

        options.intl.mode = Some(IntlMode::FullIcu);
        assert!(validate_options(&options).unwrap_err().is_validation());
    }

    #[test]
    fn test_no_asm_with_shared_openssl() {
        let mut options = Options::default();
        options.tls.no_asm = true;
        options.shared_libs.openssl.shared = true;
        assert!(validate_options(&options)
            .unwrap_err()
            .to_string()
            .contains("--shared-openssl"));
    }

    #[test]
    fn test_tls_conflict_fails_before_anything_resolves() {
        let mut options = Options::default();
        options.tls.without_ssl = true;
        options.shared_libs.openssl.shared = true;
        // Would also fail the large-pages gate, but the TLS conflict wins.
        options.profiling.large_pages = true;
        options.dest_os = Some(Os::Mac);

        let host = host_env(Os::Linux);
        let facts = facts_for(Arch::X64);
        let tmp = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        let packages = FakePackages::new();
        let fetcher = FakeFetcher::offline();
        let cx = ResolveCx {
            options: &options,
            host: &host,
            facts: &facts,
            layout: &layout,
            packages: &packages,
            fetcher: &fetcher,
            minimum_icu: 64,
        };

        let err = resolve(&cx, &mut Warnings::new()).unwrap_err();
        assert!(err.to_string().contains("--without-ssl is incompatible"));
        assert_eq!(fetcher.requests().len(), 0);
    }

    #[test]
    fn test_cross_compiling_inferred_after_alias_normalization() {
        let host = host_env(Os::Linux);
        let facts = facts_for(Arch::X64);
        let layout = ProjectLayout::new("/src");
        let packages = FakePackages::new();
        let fetcher = FakeFetcher::offline();

        let mut options = Options::default();
        options.dest_cpu = Some("x86_64".to_string());
        let cx = ResolveCx {
            options: &options,
            host: &host,
            facts: &facts,
            layout: &layout,
            packages: &packages,
            fetcher: &fetcher,
            minimum_icu: 64,
        };
        assert_eq!(cx.target_arch(), "x64");
        assert!(!cx.cross_compiling());

        let mut options = Options::default();
        options.dest_cpu = Some("arm64".to_string());
        let cx = ResolveCx {
            options: &options,
            ..cx
        };
        assert!(cx.cross_compiling());

        let mut options = Options::default();
        options.dest_cpu = Some("arm64".to_string());
        options.cross_compiling = Some(false);
        let cx = ResolveCx {
            options: &options,
            ..cx
        };
        assert!(!cx.cross_compiling());
    }
}
