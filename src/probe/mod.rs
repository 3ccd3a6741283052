//! Compiler capability probing.
//!
//! Each compiler command is asked for its predefined macros at most once per
//! run; family, version and target architecture are all derived from that
//! one table. Assembler versions are probed separately and only when the
//! bundled TLS library will assemble code.

pub mod assembler;
pub mod driver;
pub mod macros;

use std::collections::HashMap;

use serde::Serialize;

use crate::core::arch::{normalize_arch, Arch};
use crate::core::host::HostEnv;
use crate::core::options::Options;
use crate::core::version::CompilerVersion;
use crate::error::ConfigureResult;
use crate::util::diagnostic::{suggestions, Diagnostic, Warnings};

pub use assembler::{AssemblerInfo, AssemblerKind};
pub use driver::{CompilerDriver, HostDriver};
pub use macros::MacroTable;

/// Oldest C++ compilers known to build the runtime.
const CXX_MIN_GCC: CompilerVersion = CompilerVersion::new(6, 3, 0);
const CXX_MIN_CLANG: CompilerVersion = CompilerVersion::new(8, 0, 0);
/// Oldest C compiler known to build the bundled C dependencies.
const CC_MIN_GCC: CompilerVersion = CompilerVersion::new(4, 2, 0);

/// Compiler family as far as configure cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerFamily {
    Gcc,
    Clang,
}

impl CompilerFamily {
    pub fn is_clang(&self) -> bool {
        matches!(self, CompilerFamily::Clang)
    }
}

/// What one compiler command reported about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    pub command: String,
    pub family: CompilerFamily,
    pub version: CompilerVersion,
    pub arch: Arch,
    pub assembler: Option<AssemblerInfo>,
}

/// Memoizing front end to a [`CompilerDriver`].
pub struct CapabilityProbe {
    driver: Box<dyn CompilerDriver>,
    cache: HashMap<String, MacroTable>,
}

impl CapabilityProbe {
    pub fn new(driver: Box<dyn CompilerDriver>) -> Self {
        CapabilityProbe {
            driver,
            cache: HashMap::new(),
        }
    }

    /// Probe backed by real subprocesses.
    pub fn host() -> Self {
        CapabilityProbe::new(Box::new(HostDriver))
    }

    /// Predefined macros of `compiler`, invoking it only on first use.
    pub fn macros(&mut self, compiler: &str) -> ConfigureResult<&MacroTable> {
        if !self.cache.contains_key(compiler) {
            let table = self.driver.predefined_macros(compiler)?;
            tracing::debug!("`{}` predefines {} macros", compiler, table.len());
            self.cache.insert(compiler.to_string(), table);
        }
        Ok(&self.cache[compiler])
    }

    /// Family, version and architecture of `compiler`.
    pub fn probe(&mut self, compiler: &str) -> ConfigureResult<CapabilitySnapshot> {
        let table = self.macros(compiler)?;
        Ok(CapabilitySnapshot {
            command: compiler.to_string(),
            family: table.family(),
            version: table.version(),
            arch: table.arch(),
            assembler: None,
        })
    }

    /// Number of distinct compiler commands probed so far.
    pub fn probed_commands(&self) -> usize {
        self.cache.len()
    }

    /// GNU assembler version behind `compiler`, or `"0"` with a warning.
    pub fn gas_version(&self, compiler: &str, warnings: &mut Warnings) -> String {
        let found = self
            .driver
            .gas_banner(compiler)
            .ok()
            .and_then(|banner| assembler::parse_gas_version(&banner));

        found.unwrap_or_else(|| {
            warnings.warn(
                "Could not recognize `gas`. Ensure `as` from GNU binutils is on the PATH \
                 or build with `--openssl-no-asm`",
            );
            "0".to_string()
        })
    }

    /// NASM version, or `"0"` with a warning.
    pub fn nasm_version(&self, nasm: &str, warnings: &mut Warnings) -> String {
        match self.driver.nasm_banner(nasm) {
            Ok(banner) => assembler::parse_nasm_version(&banner).unwrap_or_else(|| "0".to_string()),
            Err(_) => {
                warnings.push(
                    Diagnostic::warning(
                        "No acceptable ASM compiler found! Please make sure you have installed NASM",
                    )
                    .with_suggestion("add NASM to the PATH or build with `--openssl-no-asm`"),
                );
                "0".to_string()
            }
        }
    }
}

/// Facts gathered about the build machine's toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainFacts {
    pub host_arch: Arch,
    pub cc: Option<CapabilitySnapshot>,
    pub cxx: Option<CapabilitySnapshot>,
    /// Macros of the C compiler, used for ARM defaults.
    pub cc_macros: MacroTable,
    /// NASM on Windows hosts.
    pub nasm: Option<AssemblerInfo>,
}

impl ToolchainFacts {
    /// The assembler the TLS library would use, if one was probed.
    pub fn assembler(&self) -> Option<&AssemblerInfo> {
        self.cc
            .as_ref()
            .and_then(|cc| cc.assembler.as_ref())
            .or(self.nasm.as_ref())
    }

    /// Whether NASM was looked for on Windows and not found.
    pub fn nasm_missing(&self) -> bool {
        self.nasm.as_ref().is_some_and(AssemblerInfo::is_unknown)
    }

    /// Whether both compilers are GCC at `floor` or newer.
    ///
    /// Clang, or a compiler that was never probed, never qualifies.
    pub fn gcc_at_least(&self, floor: CompilerVersion) -> bool {
        [&self.cc, &self.cxx].iter().all(|snapshot| {
            snapshot
                .as_ref()
                .is_some_and(|s| s.family == CompilerFamily::Gcc && s.version >= floor)
        })
    }

    /// Whether the C compiler is clang.
    pub fn is_clang(&self) -> bool {
        self.cc.as_ref().is_some_and(|cc| cc.family.is_clang())
    }
}

/// Probe the compilers and, when the bundled TLS library assembles code,
/// the assembler.
///
/// Compilers older than the supported floor produce warnings, not errors.
pub fn probe_toolchain(
    probe: &mut CapabilityProbe,
    options: &Options,
    host: &HostEnv,
    warnings: &mut Warnings,
) -> ConfigureResult<ToolchainFacts> {
    let wants_asm = !options.tls.without_ssl
        && !options.tls.no_asm
        && !options.shared_libs.openssl.shared;

    if !host.can_probe() {
        let x86_target = options
            .dest_cpu
            .as_deref()
            .map(normalize_arch)
            .map_or(true, |cpu| cpu == "ia32" || cpu == "x64");

        let nasm = if wants_asm && x86_target {
            let version = probe.nasm_version(&host.nasm, warnings);
            Some(AssemblerInfo::new(AssemblerKind::Nasm, version))
        } else {
            None
        };

        return Ok(ToolchainFacts {
            host_arch: host.env_arch(),
            cc: None,
            cxx: None,
            cc_macros: MacroTable::default(),
            nasm,
        });
    }

    let cxx = probe.probe(&host.cxx)?;
    let cxx_floor = if cxx.family.is_clang() {
        CXX_MIN_CLANG
    } else {
        CXX_MIN_GCC
    };
    if cxx.version < cxx_floor {
        warnings.push(
            Diagnostic::warning(format!(
                "C++ compiler `{}` (v{}) too old, need {} {} or newer",
                host.cxx,
                cxx.version,
                if cxx.family.is_clang() { "clang++" } else { "g++" },
                cxx_floor
            ))
            .with_suggestion(suggestions::SET_CC),
        );
    }

    let mut cc = probe.probe(&host.cc)?;
    if !cc.family.is_clang() && cc.version < CC_MIN_GCC {
        warnings.push(
            Diagnostic::warning(format!(
                "C compiler `{}` (v{}) too old, need gcc {} or newer",
                host.cc, cc.version, CC_MIN_GCC
            ))
            .with_suggestion(suggestions::SET_CC),
        );
    }

    let host_arch = probe.probe(host.host_compiler())?.arch;
    let cc_macros = probe.macros(&host.cc)?.clone();

    if wants_asm {
        cc.assembler = Some(if cc.family.is_clang() {
            AssemblerInfo::new(AssemblerKind::Llvm, cc.version.to_string())
        } else {
            AssemblerInfo::new(AssemblerKind::Gas, probe.gas_version(&host.cc, warnings))
        });
    }

    tracing::debug!(
        "host arch {}, cc {:?} {}, cxx {:?} {}",
        host_arch,
        cc.family,
        cc.version,
        cxx.family,
        cxx.version
    );

    Ok(ToolchainFacts {
        host_arch,
        cc: Some(cc),
        cxx: Some(cxx),
        cc_macros,
        nasm: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arch::Os;
    use crate::test_support::{host_env, FakeDriver};

    #[test]
    fn test_probe_is_memoized_per_command() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__");
        let calls = driver.calls();
        let mut probe = CapabilityProbe::new(Box::new(driver));

        let first = probe.probe("gcc").unwrap();
        let second = probe.probe("gcc").unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(probe.probed_commands(), 1);

        probe.probe("g++").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_old_compilers_warn() {
        let driver = FakeDriver::gcc(CompilerVersion::new(4, 1, 2), "__x86_64__");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut warnings = Warnings::new();
        let host = host_env(Os::Linux);

        let facts = probe_toolchain(&mut probe, &Options::default(), &host, &mut warnings).unwrap();
        assert_eq!(facts.host_arch, Arch::X64);
        assert!(warnings.contains("C++ compiler"));
        assert!(warnings.contains("need gcc 4.2.0 or newer"));
    }

    #[test]
    fn test_gas_probed_for_bundled_tls() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__")
            .with_gas_banner("GNU assembler version 2.40 (x86_64-linux-gnu)");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut warnings = Warnings::new();

        let facts = probe_toolchain(
            &mut probe,
            &Options::default(),
            &host_env(Os::Linux),
            &mut warnings,
        )
        .unwrap();
        let asm = facts.assembler().unwrap();
        assert_eq!(asm.kind, AssemblerKind::Gas);
        assert_eq!(asm.version, "2.40");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_assembler_skipped_without_asm() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut options = Options::default();
        options.tls.no_asm = true;

        let facts =
            probe_toolchain(&mut probe, &options, &host_env(Os::Linux), &mut Warnings::new())
                .unwrap();
        assert!(facts.assembler().is_none());
    }

    #[test]
    fn test_unrecognized_gas_warns_and_reports_zero() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__")
            .with_gas_banner("Apple LLVM assembler");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut warnings = Warnings::new();

        let facts = probe_toolchain(
            &mut probe,
            &Options::default(),
            &host_env(Os::Linux),
            &mut warnings,
        )
        .unwrap();
        assert!(facts.assembler().unwrap().is_unknown());
        assert!(warnings.contains("Could not recognize `gas`"));
    }

    #[test]
    fn test_windows_reads_arch_from_env_and_probes_nasm() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__");
        let calls = driver.calls();
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut host = host_env(Os::Win);
        host.processor_architecture = Some("AMD64".to_string());
        let mut warnings = Warnings::new();

        let facts = probe_toolchain(&mut probe, &Options::default(), &host, &mut warnings).unwrap();
        assert_eq!(facts.host_arch, Arch::X64);
        assert_eq!(calls.get(), 0);
        assert!(facts.nasm_missing());
        assert!(warnings.contains("NASM"));
    }

    #[test]
    fn test_windows_nasm_version() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__")
            .with_nasm_banner("NASM version 2.16.01 compiled on Dec 21 2022\n");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut host = host_env(Os::Win);
        host.processor_architecture = Some("AMD64".to_string());
        let mut warnings = Warnings::new();

        let facts = probe_toolchain(&mut probe, &Options::default(), &host, &mut warnings).unwrap();
        assert!(!facts.nasm_missing());
        assert_eq!(facts.nasm.as_ref().unwrap().version, "2.16");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_gcc_at_least_rejects_clang() {
        let gcc = FakeDriver::gcc(CompilerVersion::new(5, 4, 1), "__x86_64__");
        let mut probe = CapabilityProbe::new(Box::new(gcc));
        let facts = probe_toolchain(
            &mut probe,
            &Options::default(),
            &host_env(Os::Linux),
            &mut Warnings::new(),
        )
        .unwrap();
        assert!(facts.gcc_at_least(CompilerVersion::new(5, 4, 1)));

        let clang = FakeDriver::clang(CompilerVersion::new(16, 0, 0), "__x86_64__");
        let mut probe = CapabilityProbe::new(Box::new(clang));
        let facts = probe_toolchain(
            &mut probe,
            &Options::default(),
            &host_env(Os::Linux),
            &mut Warnings::new(),
        )
        .unwrap();
        assert!(facts.is_clang());
        assert!(!facts.gcc_at_least(CompilerVersion::new(5, 4, 1)));
        assert_eq!(facts.assembler().unwrap().kind, AssemblerKind::Llvm);
    }
}
