//! TLS library configuration.
//!
//! Wraps the shared-library resolver for `openssl` with the TLS-specific
//! rules: assembler floors for the bundled library and certificate store
//! switches.

use crate::core::descriptor::Fragment;
use crate::core::options::Dependency;
use crate::error::{ConfigureError, ConfigureResult};
use crate::util::diagnostic::{suggestions, Warnings};

use super::shared::resolve_dependency;
use super::ResolveCx;

/// Architectures whose bundled TLS assembly needs a recent assembler.
const ASM_SENSITIVE_ARCHS: [&str; 2] = ["x64", "ia32"];

pub fn resolve_tls(cx: &ResolveCx<'_>, warnings: &mut Warnings) -> ConfigureResult<Fragment> {
    let tls = &cx.options.tls;
    let shared = cx.options.shared_libs.openssl.shared;

    // NASM missing on Windows downgrades to the portable C code paths.
    let no_asm = tls.no_asm || cx.facts.nasm_missing();

    let mut out = Fragment::new();
    out.set("use_openssl", !tls.without_ssl);
    out.set("openssl_is_fips", tls.is_fips);
    out.set("openssl_no_asm", no_asm);

    if tls.without_ssl {
        out.set("shared_openssl", false);
        return Ok(out);
    }

    if tls.use_def_ca_store {
        out.define("NODE_OPENSSL_CERT_STORE");
    }
    if let Some(ref path) = tls.system_ca_path {
        out.set("openssl_system_ca_path", path.as_str());
    }

    if shared {
        tracing::debug!("linking the system TLS library");
    } else if no_asm {
        warnings.warn("building openssl with no asm is slower");
    } else if ASM_SENSITIVE_ARCHS.contains(&cx.target_arch()) {
        check_assembler(cx)?;
    }

    let spec = resolve_dependency(
        Dependency::OpenSsl,
        &cx.options.shared_libs.openssl,
        cx.packages,
        cx.flavor(),
    );
    let shared_fragment = spec.to_fragment();
    for (key, value) in shared_fragment.variables {
        out.set(&key, value);
    }
    for dir in shared_fragment.include_dirs {
        out.include_dir(dir);
    }
    for flag in shared_fragment.libraries {
        out.library(flag);
    }

    Ok(out)
}

fn check_assembler(cx: &ResolveCx<'_>) -> ConfigureResult<()> {
    let supported = cx
        .facts
        .assembler()
        .is_some_and(|asm| asm.supports_tls_asm());
    if supported {
        return Ok(());
    }

    let found = cx
        .facts
        .assembler()
        .map(|asm| format!("{} {}", asm.kind.var_name(), asm.version))
        .unwrap_or_else(|| "none".to_string());
    Err(ConfigureError::validation_with_hint(
        format!(
            "did not find a new enough assembler (found {}); need gas 2.23, llvm 3.3 or nasm 2.10",
            found
        ),
        suggestions::OPENSSL_NO_ASM,
    ))
}
