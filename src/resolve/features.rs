//! Architecture, platform and profiling features.

use crate::core::arch::Os;
use crate::core::descriptor::{Fragment, Value};
use crate::core::options::{Options, StaticLinking};
use crate::core::version::CompilerVersion;
use crate::error::{ConfigureError, ConfigureResult};
use crate::util::diagnostic::{suggestions, Warnings};

use super::ResolveCx;

/// Oldest GCC that produces working PGO and LTO builds.
pub const PROFILING_MIN_GCC: CompilerVersion = CompilerVersion::new(5, 4, 1);

/// Oldest Linux kernel with transparent huge pages usable for text.
const LARGE_PAGES_MIN_KERNEL: (u32, u32, u32) = (2, 6, 38);

const VTUNE_ARCHS: [&str; 3] = ["x64", "ia32", "x32"];

/// Architecture, toolchain, profiling and platform variables.
pub fn resolve_toolchain(cx: &ResolveCx<'_>) -> ConfigureResult<Fragment> {
    let options = cx.options;
    let flavor = cx.flavor();
    let target_arch = cx.target_arch();
    let mut out = Fragment::new();

    out.set("host_arch", cx.host_arch());
    out.set("target_arch", target_arch);
    out.set("byteorder", cx.host.endianness.as_str());
    out.set("want_separate_host_toolset", i64::from(cx.cross_compiling()));

    if target_arch == "arm" {
        resolve_arm(cx, &mut out);
    }

    if let Some(asm) = cx.facts.assembler() {
        out.set(asm.kind.var_name(), asm.version.as_str());
    }

    resolve_profiling(cx, &mut out)?;
    resolve_platform(cx, &mut out)?;

    out.set("prefix", options.prefix.as_str());
    out.set(
        "default_configuration",
        if options.debug { "Debug" } else { "Release" },
    );
    out.set(
        "tag",
        options
            .tag
            .as_deref()
            .map(|t| format!("-{}", t))
            .unwrap_or_default(),
    );
    out.set(
        "release_urlbase",
        options.release_urlbase.clone().unwrap_or_default(),
    );
    out.set("debug_lib", options.debug_lib);
    out.set("debug_nghttp2", i64::from(options.debug_nghttp2));
    out.set("coverage", options.coverage);
    out.set("asan", i64::from(options.enable_asan));
    out.set("shared", options.shared);
    out.set("target_type", target_type(options, flavor));

    tracing::debug!("target {} on {} ({})", target_arch, flavor, cx.host_arch());
    Ok(out)
}

fn target_type(options: &Options, flavor: Os) -> &'static str {
    // AIX always links the runtime as an archive.
    if flavor == Os::Aix {
        "static_library"
    } else if options.shared {
        "shared_library"
    } else if options.enable_static {
        "static_library"
    } else {
        "executable"
    }
}

fn resolve_arm(cx: &ResolveCx<'_>, out: &mut Fragment) {
    let macros = &cx.facts.cc_macros;
    let arm_arch = macros.get("__ARM_ARCH");
    let android = cx.flavor() == Os::Android;

    let float_abi = match cx.options.arm_float_abi {
        Some(ref abi) => abi.clone(),
        None if macros.contains("__ARM_PCS_VFP") => "hard".to_string(),
        None => "default".to_string(),
    };

    let (version, fpu) = if arm_arch == Some("7") || android {
        ("7", "vfpv3")
    } else if arm_arch == Some("6") {
        ("6", "vfp")
    } else {
        ("default", "vfp")
    };

    out.set("arm_version", version);
    out.set("arm_thumb", 0i64);
    out.set("arm_float_abi", float_abi);
    out.set(
        "arm_fpu",
        cx.options.arm_fpu.clone().unwrap_or_else(|| fpu.to_string()),
    );
}

fn resolve_profiling(cx: &ResolveCx<'_>, out: &mut Fragment) -> ConfigureResult<()> {
    let profiling = &cx.options.profiling;
    let flavor = cx.flavor();
    let pgo = profiling.pgo_generate || profiling.pgo_use;

    if pgo && flavor != Os::Linux {
        return Err(ConfigureError::validation(
            "the pgo options are supported only on linux",
        ));
    }
    if pgo && !cx.facts.gcc_at_least(PROFILING_MIN_GCC) {
        return Err(ConfigureError::validation_with_hint(
            format!(
                "--enable-pgo-generate and --enable-pgo-use require gcc and g++ {} or newer",
                PROFILING_MIN_GCC
            ),
            suggestions::SET_CC,
        ));
    }
    out.set("enable_pgo_generate", profiling.pgo_generate);
    out.set("enable_pgo_use", profiling.pgo_use);

    if profiling.lto && flavor != Os::Linux {
        return Err(ConfigureError::validation(
            "the lto option is supported only on linux",
        ));
    }
    if profiling.lto && !cx.facts.gcc_at_least(PROFILING_MIN_GCC) {
        return Err(ConfigureError::validation_with_hint(
            format!(
                "--enable-lto requires gcc and g++ {} or newer",
                PROFILING_MIN_GCC
            ),
            suggestions::SET_CC,
        ));
    }
    out.set("enable_lto", profiling.lto);

    if profiling.vtune && !VTUNE_ARCHS.contains(&cx.target_arch()) {
        return Err(ConfigureError::validation(
            "the VTune profiler is only supported on x32, x64 and ia32 systems",
        ));
    }
    out.set("enable_vtune_profiling", profiling.vtune);

    if profiling.large_pages {
        check_large_pages(cx)?;
    }
    out.set("use_large_pages", profiling.large_pages);

    Ok(())
}

fn check_large_pages(cx: &ResolveCx<'_>) -> ConfigureResult<()> {
    if cx.flavor() != Os::Linux {
        return Err(ConfigureError::validation(
            "large pages are supported only on Linux systems",
        ));
    }
    if cx.target_arch() != "x64" {
        return Err(ConfigureError::validation(
            "large pages are supported only on the x64 platform",
        ));
    }
    if cx.options.shared || cx.options.enable_static {
        return Err(ConfigureError::validation(
            "large pages are supported only while creating an executable",
        ));
    }

    // The kernel floor only means something for the machine we run on.
    if let Some(release) = cx.host.kernel_release.as_deref() {
        if let Some(version) = parse_kernel_release(release) {
            if version < LARGE_PAGES_MIN_KERNEL {
                return Err(ConfigureError::validation(format!(
                    "large pages need Linux kernel version >= 2.6.38, found {}",
                    release
                )));
            }
        }
    }
    Ok(())
}

/// Leading `a.b.c` of a kernel release such as `5.15.0-91-generic`.
fn parse_kernel_release(release: &str) -> Option<(u32, u32, u32)> {
    let mut parts = release.split(|c: char| !c.is_ascii_digit()).filter(|p| !p.is_empty());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some((major, minor, patch))
}

fn resolve_platform(cx: &ResolveCx<'_>, out: &mut Fragment) -> ConfigureResult<()> {
    let options = cx.options;
    let flavor = cx.flavor();

    let use_dtrace = match flavor {
        Os::Solaris | Os::Mac => options.dtrace != Some(false),
        Os::Linux | Os::FreeBsd => options.dtrace == Some(true),
        _ if options.dtrace == Some(true) => {
            return Err(ConfigureError::validation(
                "DTrace is currently only supported on SunOS, MacOS or Linux systems",
            ));
        }
        _ => false,
    };
    out.set("use_dtrace", use_dtrace);

    if flavor == Os::Linux {
        if let Some(ref dir) = options.systemtap_includes {
            out.include_dir(dir.clone());
        }
    }

    if options.no_ifaddrs {
        out.define("SUNOS_NO_IFADDRS");
    }

    out.set("use_etw", flavor == Os::Win && !options.without_etw);

    if options.with_ltcg && flavor != Os::Win {
        return Err(ConfigureError::validation(
            "link time code generation is only supported on Windows",
        ));
    }
    out.set("with_ltcg", options.with_ltcg);

    Ok(())
}

/// Static linking flags for the final executable.
pub fn resolve_static_linking(cx: &ResolveCx<'_>, warnings: &mut Warnings) -> Fragment {
    let mut out = Fragment::new();
    let linking = cx.options.static_linking;
    if linking == StaticLinking::None {
        return out;
    }

    if cx.flavor() == Os::Mac {
        warnings.warn(
            "Generation of static executable will not work on OSX when using the default \
             compilation environment",
        );
        return out;
    }

    match linking {
        StaticLinking::Fully => out.library("-static"),
        StaticLinking::Partly => {
            out.library("-static-libgcc");
            out.library("-static-libstdc++");
            if cx.options.enable_asan {
                out.library("-static-libasan");
            }
        }
        StaticLinking::None => {}
    }
    out
}

/// The inspector needs both TLS and Intl; without either it is switched off
/// quietly.
pub fn resolve_inspector(options: &Options) -> Fragment {
    let disabled =
        options.without_inspector || !options.intl.enabled() || options.tls.without_ssl;
    let mut out = Fragment::new();
    out.set("enable_inspector", Value::from(!disabled));
    out
}
