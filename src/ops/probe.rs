//! Implementation of `preconf probe`.

use std::fmt::Write as _;

use crate::core::host::HostEnv;
use crate::core::options::Options;
use crate::error::ConfigureResult;
use crate::probe::{probe_toolchain, CapabilityProbe, CapabilitySnapshot, ToolchainFacts};
use crate::util::config::{global_config_path, load_config, project_config_path};
use crate::util::diagnostic::Warnings;

/// Capability snapshot of the host toolchain.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub facts: ToolchainFacts,
    pub warnings: Warnings,
}

/// Probe the host toolchain as configure would with default options.
pub fn probe_host(root: &std::path::Path) -> ConfigureResult<ProbeReport> {
    let config = load_config(global_config_path().as_deref(), &project_config_path(root));
    let host = HostEnv::from_env(&config.toolchain);
    probe_with(&mut CapabilityProbe::host(), &host)
}

pub fn probe_with(probe: &mut CapabilityProbe, host: &HostEnv) -> ConfigureResult<ProbeReport> {
    let mut warnings = Warnings::new();
    let facts = probe_toolchain(probe, &Options::default(), host, &mut warnings)?;
    Ok(ProbeReport { facts, warnings })
}

/// Render a report as aligned `key: value` lines.
pub fn format_report(report: &ProbeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {}", "host arch:", report.facts.host_arch);

    for (label, snapshot) in [("cc:", &report.facts.cc), ("cxx:", &report.facts.cxx)] {
        match snapshot {
            Some(s) => {
                let _ = writeln!(out, "{:<12} {}", label, describe(s));
            }
            None => {
                let _ = writeln!(out, "{:<12} (not probed)", label);
            }
        }
    }

    if let Some(asm) = report.facts.assembler() {
        let _ = writeln!(out, "{:<12} {} {}", "assembler:", asm.kind.var_name(), asm.version);
    }
    out
}

fn describe(s: &CapabilitySnapshot) -> String {
    let family = if s.family.is_clang() { "clang" } else { "gcc" };
    format!("{} ({} {}, {})", s.command, family, s.version, s.arch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arch::Os;
    use crate::core::version::CompilerVersion;
    use crate::test_support::{host_env, FakeDriver};

    #[test]
    fn test_format_report() {
        let driver = FakeDriver::clang(CompilerVersion::new(16, 0, 6), "__aarch64__");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let report = probe_with(&mut probe, &host_env(Os::Mac)).unwrap();

        let text = format_report(&report);
        assert!(text.contains("host arch:   arm64"));
        assert!(text.contains("cc:          gcc (clang 16.0.6, arm64)"));
        assert!(text.contains("assembler:   llvm_version 16.0.6"));
    }

    #[test]
    fn test_windows_host_is_not_probed() {
        let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__");
        let mut probe = CapabilityProbe::new(Box::new(driver));
        let mut host = host_env(Os::Win);
        host.processor_architecture = Some("AMD64".to_string());

        let report = probe_with(&mut probe, &host).unwrap();
        let text = format_report(&report);
        assert!(text.contains("host arch:   x64"));
        assert!(text.contains("cxx:         (not probed)"));
        assert!(report.warnings.contains("NASM"));
    }
}
