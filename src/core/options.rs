//! The immutable snapshot of user intent consumed by every resolver.
//!
//! Options are built once (by the CLI) and never mutated afterwards.
//! Derived facts such as "are we cross-compiling" are computed by the
//! resolvers and written into the descriptor instead.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::arch::Os;

/// Locales used by small ICU when none are requested.
pub const ICU_DEFAULT_LOCALES: &str = "root,en";

/// External libraries that may be linked from the system instead of built
/// from bundled sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency {
    Zlib,
    HttpParser,
    Libuv,
    Cares,
    Nghttp2,
    OpenSsl,
}

impl Dependency {
    /// Dependencies resolved by the plain shared-library resolver, in
    /// descriptor order. OpenSSL is handled by the TLS resolver.
    pub const PLAIN: [Dependency; 5] = [
        Dependency::Zlib,
        Dependency::HttpParser,
        Dependency::Libuv,
        Dependency::Cares,
        Dependency::Nghttp2,
    ];

    /// Suffix of the `shared_<name>` descriptor variable.
    pub fn var_name(&self) -> &'static str {
        match self {
            Dependency::Zlib => "zlib",
            Dependency::HttpParser => "http_parser",
            Dependency::Libuv => "libuv",
            Dependency::Cares => "cares",
            Dependency::Nghttp2 => "nghttp2",
            Dependency::OpenSsl => "openssl",
        }
    }

    /// Module name passed to pkg-config.
    pub fn pkg_config_name(&self) -> &'static str {
        match self {
            Dependency::Cares => "libcares",
            other => other.var_name(),
        }
    }

    /// Library names linked when neither the user nor pkg-config name any.
    pub fn default_libnames(&self) -> &'static [&'static str] {
        match self {
            Dependency::Zlib => &["z"],
            Dependency::HttpParser => &["http_parser"],
            Dependency::Libuv => &["uv"],
            Dependency::Cares => &["cares"],
            Dependency::Nghttp2 => &["nghttp2"],
            Dependency::OpenSsl => &["crypto", "ssl"],
        }
    }

    /// CLI flag stem, e.g. `shared-http-parser`.
    pub fn flag(&self) -> String {
        format!("--shared-{}", self.var_name().replace('_', "-"))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.var_name())
    }
}

/// Per-dependency shared-library request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedLibOptions {
    pub shared: bool,
    pub includes: Option<String>,
    pub libpath: Option<String>,
    /// Comma-separated library names.
    pub libname: Option<String>,
}

/// Shared-library requests for every dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedLibs {
    pub zlib: SharedLibOptions,
    pub http_parser: SharedLibOptions,
    pub libuv: SharedLibOptions,
    pub cares: SharedLibOptions,
    pub nghttp2: SharedLibOptions,
    pub openssl: SharedLibOptions,
}

impl SharedLibs {
    pub fn get(&self, dep: Dependency) -> &SharedLibOptions {
        match dep {
            Dependency::Zlib => &self.zlib,
            Dependency::HttpParser => &self.http_parser,
            Dependency::Libuv => &self.libuv,
            Dependency::Cares => &self.cares,
            Dependency::Nghttp2 => &self.nghttp2,
            Dependency::OpenSsl => &self.openssl,
        }
    }
}

/// TLS library flags other than the shared-library request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    pub without_ssl: bool,
    pub no_asm: bool,
    pub fips: Option<String>,
    pub is_fips: bool,
    pub use_def_ca_store: bool,
    pub system_ca_path: Option<String>,
}

/// Internationalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntlMode {
    None,
    #[default]
    SmallIcu,
    FullIcu,
    SystemIcu,
}

impl IntlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntlMode::None => "none",
            IntlMode::SmallIcu => "small-icu",
            IntlMode::FullIcu => "full-icu",
            IntlMode::SystemIcu => "system-icu",
        }
    }
}

impl FromStr for IntlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(IntlMode::None),
            "small-icu" => Ok(IntlMode::SmallIcu),
            "full-icu" => Ok(IntlMode::FullIcu),
            "system-icu" => Ok(IntlMode::SystemIcu),
            other => Err(format!(
                "unknown intl mode `{}` (expected none, small-icu, full-icu or system-icu)",
                other
            )),
        }
    }
}

/// Which artifacts configure may download by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadPolicy {
    pub icu: bool,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        DownloadPolicy { icu: true }
    }
}

impl FromStr for DownloadPolicy {
    type Err = String;

    /// Parse a comma list such as `all`, `none`, `icu` or `none,icu`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut policy = DownloadPolicy { icu: false };
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            match item {
                "all" => policy.icu = true,
                "none" => policy.icu = false,
                "icu" => policy.icu = true,
                "-icu" => policy.icu = false,
                other => return Err(format!("unknown download type `{}`", other)),
            }
        }
        Ok(policy)
    }
}

/// Internationalization flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntlOptions {
    /// `None` when the user did not pick a mode.
    pub mode: Option<IntlMode>,
    /// Path to an externally maintained ICU generator file.
    pub icu_path: Option<PathBuf>,
    /// Comma-separated locale list for small ICU.
    pub locales: String,
    /// Local directory, local archive or URL of an icu4c source tree.
    pub icu_source: Option<String>,
    pub downloads: DownloadPolicy,
    pub download_path: PathBuf,
}

impl IntlOptions {
    /// The mode in effect, falling back to the default.
    pub fn effective_mode(&self) -> IntlMode {
        self.mode.unwrap_or_default()
    }

    /// Whether Intl support ends up enabled at all.
    pub fn enabled(&self) -> bool {
        self.icu_path.is_some() || self.effective_mode() != IntlMode::None
    }
}

impl Default for IntlOptions {
    fn default() -> Self {
        IntlOptions {
            mode: None,
            icu_path: None,
            locales: ICU_DEFAULT_LOCALES.to_string(),
            icu_source: None,
            downloads: DownloadPolicy::default(),
            download_path: PathBuf::from("deps"),
        }
    }
}

/// Profiling and whole-program optimization flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilingOptions {
    pub pgo_generate: bool,
    pub pgo_use: bool,
    pub lto: bool,
    pub vtune: bool,
    pub large_pages: bool,
}

/// How the final executable links the C/C++ runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaticLinking {
    #[default]
    None,
    Fully,
    Partly,
}

/// Complete set of user options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub prefix: String,
    pub debug: bool,
    pub coverage: bool,

    /// Target CPU as given by the user, before alias normalization.
    pub dest_cpu: Option<String>,
    pub dest_os: Option<Os>,
    pub cross_compiling: Option<bool>,
    pub arm_float_abi: Option<String>,
    pub arm_fpu: Option<String>,

    pub profiling: ProfilingOptions,
    pub tls: TlsOptions,
    pub intl: IntlOptions,
    pub shared_libs: SharedLibs,

    pub static_linking: StaticLinking,
    /// Build the runtime as a static library.
    pub enable_static: bool,
    /// Build the runtime as a shared library.
    pub shared: bool,
    pub enable_asan: bool,

    pub without_inspector: bool,
    pub debug_lib: bool,
    pub debug_nghttp2: bool,

    /// `Some(true)` for `--with-dtrace`, `Some(false)` for `--without-dtrace`.
    pub dtrace: Option<bool>,
    pub without_etw: bool,
    pub with_ltcg: bool,
    pub no_ifaddrs: bool,
    pub systemtap_includes: Option<String>,

    pub tag: Option<String>,
    pub release_urlbase: Option<String>,

    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            prefix: "/usr/local".to_string(),
            debug: false,
            coverage: false,
            dest_cpu: None,
            dest_os: None,
            cross_compiling: None,
            arm_float_abi: None,
            arm_fpu: None,
            profiling: ProfilingOptions::default(),
            tls: TlsOptions::default(),
            intl: IntlOptions::default(),
            shared_libs: SharedLibs::default(),
            static_linking: StaticLinking::None,
            enable_static: false,
            shared: false,
            enable_asan: false,
            without_inspector: false,
            debug_lib: false,
            debug_nghttp2: false,
            dtrace: None,
            without_etw: false,
            with_ltcg: false,
            no_ifaddrs: false,
            systemtap_includes: None,
            tag: None,
            release_urlbase: None,
            verbose: false,
        }
    }
}
