//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use preconf::core::options::{DownloadPolicy, IntlMode, ICU_DEFAULT_LOCALES};
use preconf::core::Os;

/// preconf - resolve build configuration for the runtime
#[derive(Parser)]
#[command(name = "preconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "directory", global = true, default_value = ".")]
    pub directory: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the toolchain, resolve features and write the descriptor
    Configure(ConfigureArgs),

    /// Show what the host compilers report about themselves
    Probe(ProbeArgs),
}

#[derive(Args)]
pub struct ProbeArgs {}

fn parse_os(s: &str) -> Result<Os, String> {
    Os::parse(s).ok_or_else(|| {
        format!(
            "unknown operating system `{}` (expected win, mac, linux, android, solaris, freebsd, openbsd or aix)",
            s
        )
    })
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Install prefix
    #[arg(long, default_value = "/usr/local")]
    pub prefix: String,

    /// Build the debug configuration
    #[arg(long)]
    pub debug: bool,

    /// Build with code coverage instrumentation
    #[arg(long)]
    pub coverage: bool,

    /// Directory for config.json and icu_config.json
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    // Target
    /// CPU architecture to build for
    #[arg(long, value_name = "ARCH")]
    pub dest_cpu: Option<String>,

    /// Operating system to build for
    #[arg(long, value_name = "OS", value_parser = parse_os)]
    pub dest_os: Option<Os>,

    /// Force cross-compilation on
    #[arg(long, conflicts_with = "no_cross_compiling")]
    pub cross_compiling: bool,

    /// Force cross-compilation off
    #[arg(long)]
    pub no_cross_compiling: bool,

    /// ARM float ABI (soft, softfp, hard)
    #[arg(long, value_name = "ABI")]
    pub with_arm_float_abi: Option<String>,

    /// ARM FPU (vfp, vfpv3, vfpv3-d16, neon)
    #[arg(long, value_name = "FPU")]
    pub with_arm_fpu: Option<String>,

    // Profiling
    /// Instrument the build for profile-guided optimization
    #[arg(long)]
    pub enable_pgo_generate: bool,

    /// Optimize using collected profile data
    #[arg(long)]
    pub enable_pgo_use: bool,

    /// Enable link-time optimization
    #[arg(long)]
    pub enable_lto: bool,

    /// Enable VTune profiling support
    #[arg(long)]
    pub enable_vtune_profiling: bool,

    /// Map the executable's text segment to large pages
    #[arg(long)]
    pub use_largepages: bool,

    // TLS
    /// Build without TLS support
    #[arg(long)]
    pub without_ssl: bool,

    /// Build the TLS library without assembly optimizations
    #[arg(long)]
    pub openssl_no_asm: bool,

    /// Build the TLS library in FIPS mode
    #[arg(long, value_name = "DIR")]
    pub openssl_fips: Option<String>,

    /// The linked TLS library is FIPS compliant
    #[arg(long)]
    pub openssl_is_fips: bool,

    /// Use the TLS library's default CA store
    #[arg(long)]
    pub openssl_use_def_ca_store: bool,

    /// Additional trusted CA certificate file or directory
    #[arg(long, value_name = "PATH")]
    pub openssl_system_ca_path: Option<String>,

    /// Link to a shared TLS library
    #[arg(long)]
    pub shared_openssl: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_openssl_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_openssl_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_openssl_libname: Option<String>,

    // Shared libraries
    /// Link to a shared zlib
    #[arg(long)]
    pub shared_zlib: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_zlib_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_zlib_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_zlib_libname: Option<String>,

    /// Link to a shared http_parser
    #[arg(long)]
    pub shared_http_parser: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_http_parser_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_http_parser_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_http_parser_libname: Option<String>,

    /// Link to a shared libuv
    #[arg(long)]
    pub shared_libuv: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_libuv_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_libuv_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_libuv_libname: Option<String>,

    /// Link to a shared c-ares
    #[arg(long)]
    pub shared_cares: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_cares_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_cares_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_cares_libname: Option<String>,

    /// Link to a shared nghttp2
    #[arg(long)]
    pub shared_nghttp2: bool,
    #[arg(long, value_name = "DIR")]
    pub shared_nghttp2_includes: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub shared_nghttp2_libpath: Option<String>,
    #[arg(long, value_name = "NAMES")]
    pub shared_nghttp2_libname: Option<String>,

    // Intl
    /// Intl mode: none, small-icu, full-icu or system-icu
    #[arg(long, value_name = "MODE", conflicts_with = "without_intl")]
    pub with_intl: Option<IntlMode>,

    /// Disable Intl (same as --with-intl=none)
    #[arg(long)]
    pub without_intl: bool,

    /// Use an externally maintained ICU generator file
    #[arg(long, value_name = "PATH")]
    pub with_icu_path: Option<PathBuf>,

    /// Comma-separated locales for small ICU ("root" is always added)
    #[arg(long, value_name = "LOCALES", default_value = ICU_DEFAULT_LOCALES)]
    pub with_icu_locales: String,

    /// ICU source: a directory, a .tgz archive or a URL
    #[arg(long, value_name = "SOURCE")]
    pub with_icu_source: Option<String>,

    /// What configure may download: all, none, icu
    #[arg(long, value_name = "LIST")]
    pub download: Option<DownloadPolicy>,

    /// Where downloaded archives are kept
    #[arg(long, value_name = "DIR", default_value = "deps")]
    pub download_path: PathBuf,

    // Linking
    /// Link the executable fully statically
    #[arg(long, conflicts_with = "partly_static")]
    pub fully_static: bool,

    /// Link the C/C++ runtimes statically
    #[arg(long)]
    pub partly_static: bool,

    /// Build the runtime as a static library
    #[arg(long, conflicts_with = "shared")]
    pub enable_static: bool,

    /// Build the runtime as a shared library
    #[arg(long)]
    pub shared: bool,

    /// Build with AddressSanitizer
    #[arg(long)]
    pub enable_asan: bool,

    // Debugging and platform
    /// Disable the inspector protocol
    #[arg(long)]
    pub without_inspector: bool,

    /// Build the runtime with debug symbols
    #[arg(long)]
    pub debug_lib: bool,

    /// Build nghttp2 with debug output
    #[arg(long)]
    pub debug_nghttp2: bool,

    /// Build with DTrace
    #[arg(long, conflicts_with = "without_dtrace")]
    pub with_dtrace: bool,

    /// Build without DTrace
    #[arg(long)]
    pub without_dtrace: bool,

    /// Build without ETW
    #[arg(long)]
    pub without_etw: bool,

    /// Use link-time code generation (Windows only)
    #[arg(long)]
    pub with_ltcg: bool,

    /// Use on deprecated SunOS systems that lack getifaddrs()
    #[arg(long)]
    pub no_ifaddrs: bool,

    /// Directory holding sys/sdt.h
    #[arg(long, value_name = "DIR")]
    pub systemtap_includes: Option<String>,

    /// Custom build tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Base URL for release downloads
    #[arg(long, value_name = "URL")]
    pub release_urlbase: Option<String>,
}
