//! `preconf configure` command

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigureArgs;
use preconf::core::options::{
    IntlMode, IntlOptions, ProfilingOptions, SharedLibOptions, SharedLibs, StaticLinking,
    TlsOptions,
};
use preconf::ops::{configure, ConfigureOptions};
use preconf::util::diagnostic::{emit, Diagnostic};
use preconf::Options;

pub fn execute(args: ConfigureArgs, root: &Path, verbose: bool, color: bool) -> Result<()> {
    let out_dir = args.out_dir.clone();
    let opts = ConfigureOptions {
        root: root.to_path_buf(),
        options: to_options(args, verbose),
        out_dir,
        show_progress: std::io::stderr().is_terminal(),
    };

    let report = match configure(&opts) {
        Ok(report) => report,
        Err(e) => {
            emit(&e.to_diagnostic(), color);
            std::process::exit(1);
        }
    };

    for path in &report.written {
        eprintln!("     Created {}", path.display());
    }

    if !report.warnings.is_empty() && !verbose {
        emit(
            &Diagnostic::warning("warnings were emitted in the configure phase")
                .with_context(format!("{} warning(s); rerun with --verbose for details", report.warnings.len())),
            color,
        );
    } else {
        eprintln!("configure completed successfully");
    }

    Ok(())
}

fn shared(shared: bool, includes: Option<String>, libpath: Option<String>, libname: Option<String>) -> SharedLibOptions {
    SharedLibOptions {
        shared,
        includes,
        libpath,
        libname,
    }
}

fn to_options(args: ConfigureArgs, verbose: bool) -> Options {
    let mode = if args.without_intl {
        Some(IntlMode::None)
    } else {
        args.with_intl
    };

    let static_linking = if args.fully_static {
        StaticLinking::Fully
    } else if args.partly_static {
        StaticLinking::Partly
    } else {
        StaticLinking::None
    };

    let cross_compiling = match (args.cross_compiling, args.no_cross_compiling) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let dtrace = match (args.with_dtrace, args.without_dtrace) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    Options {
        prefix: args.prefix,
        debug: args.debug,
        coverage: args.coverage,
        dest_cpu: args.dest_cpu,
        dest_os: args.dest_os,
        cross_compiling,
        arm_float_abi: args.with_arm_float_abi,
        arm_fpu: args.with_arm_fpu,
        profiling: ProfilingOptions {
            pgo_generate: args.enable_pgo_generate,
            pgo_use: args.enable_pgo_use,
            lto: args.enable_lto,
            vtune: args.enable_vtune_profiling,
            large_pages: args.use_largepages,
        },
        tls: TlsOptions {
            without_ssl: args.without_ssl,
            no_asm: args.openssl_no_asm,
            fips: args.openssl_fips,
            is_fips: args.openssl_is_fips,
            use_def_ca_store: args.openssl_use_def_ca_store,
            system_ca_path: args.openssl_system_ca_path,
        },
        intl: IntlOptions {
            mode,
            icu_path: args.with_icu_path,
            locales: args.with_icu_locales,
            icu_source: args.with_icu_source,
            downloads: args.download.unwrap_or_default(),
            download_path: args.download_path,
        },
        shared_libs: SharedLibs {
            zlib: shared(
                args.shared_zlib,
                args.shared_zlib_includes,
                args.shared_zlib_libpath,
                args.shared_zlib_libname,
            ),
            http_parser: shared(
                args.shared_http_parser,
                args.shared_http_parser_includes,
                args.shared_http_parser_libpath,
                args.shared_http_parser_libname,
            ),
            libuv: shared(
                args.shared_libuv,
                args.shared_libuv_includes,
                args.shared_libuv_libpath,
                args.shared_libuv_libname,
            ),
            cares: shared(
                args.shared_cares,
                args.shared_cares_includes,
                args.shared_cares_libpath,
                args.shared_cares_libname,
            ),
            nghttp2: shared(
                args.shared_nghttp2,
                args.shared_nghttp2_includes,
                args.shared_nghttp2_libpath,
                args.shared_nghttp2_libname,
            ),
            openssl: shared(
                args.shared_openssl,
                args.shared_openssl_includes,
                args.shared_openssl_libpath,
                args.shared_openssl_libname,
            ),
        },
        static_linking,
        enable_static: args.enable_static,
        shared: args.shared,
        enable_asan: args.enable_asan,
        without_inspector: args.without_inspector,
        debug_lib: args.debug_lib,
        debug_nghttp2: args.debug_nghttp2,
        dtrace,
        without_etw: args.without_etw,
        with_ltcg: args.with_ltcg,
        no_ifaddrs: args.no_ifaddrs,
        systemtap_includes: args.systemtap_includes,
        tag: args.tag,
        release_urlbase: args.release_urlbase,
        verbose,
    }
}
