//! Environment inputs read once at startup.

use crate::core::arch::{Arch, Endianness, Os};
use crate::util::config::ToolchainSettings;

/// Facts about the machine running preconf and the tool commands it should
/// use.
///
/// Built once from the process environment (or by hand in tests) and then
/// threaded through the run, so no resolver reads environment variables
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    /// C compiler command (`CC`).
    pub cc: String,
    /// C++ compiler command (`CXX`).
    pub cxx: String,
    /// Compiler used to detect the host architecture (`CC_host`).
    pub cc_host: Option<String>,
    /// Package metadata query command (`PKG_CONFIG`).
    pub pkg_config: String,
    /// NASM command for Windows hosts.
    pub nasm: String,
    /// `PROCESSOR_ARCHITEW6432`, else `PROCESSOR_ARCHITECTURE`.
    pub processor_architecture: Option<String>,
    pub os: Os,
    pub endianness: Endianness,
    /// Kernel release such as `5.15.0-91-generic`, when known.
    pub kernel_release: Option<String>,
}

impl HostEnv {
    /// Read the process environment, falling back to config-file values and
    /// then to platform defaults.
    pub fn from_env(fallbacks: &ToolchainSettings) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), fallbacks, Os::host())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, fallbacks: &ToolchainSettings, os: Os) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (default_cc, default_cxx) = if os == Os::Mac {
            ("cc", "c++")
        } else {
            ("gcc", "g++")
        };

        let cc = lookup("CC")
            .or_else(|| fallbacks.cc.clone())
            .unwrap_or_else(|| default_cc.to_string());
        let cxx = lookup("CXX")
            .or_else(|| fallbacks.cxx.clone())
            .unwrap_or_else(|| default_cxx.to_string());
        let pkg_config = lookup("PKG_CONFIG")
            .or_else(|| fallbacks.pkg_config.clone())
            .unwrap_or_else(|| "pkg-config".to_string());

        HostEnv {
            cc,
            cxx,
            cc_host: lookup("CC_host"),
            pkg_config,
            nasm: "nasm".to_string(),
            processor_architecture: lookup("PROCESSOR_ARCHITEW6432")
                .or_else(|| lookup("PROCESSOR_ARCHITECTURE")),
            os,
            endianness: Endianness::host(),
            kernel_release: read_kernel_release(),
        }
    }

    /// Whether host facts come from compiler probing. Windows hosts read
    /// the architecture from the environment instead.
    pub fn can_probe(&self) -> bool {
        self.os != Os::Win
    }

    /// Compiler used for host-architecture detection.
    pub fn host_compiler(&self) -> &str {
        if self.os == Os::Aix {
            // AIX defaults to xlc, which cannot dump GCC-style macros.
            "gcc"
        } else {
            self.cc_host.as_deref().unwrap_or(&self.cc)
        }
    }

    /// Architecture from `PROCESSOR_ARCHITECTURE`.
    pub fn env_arch(&self) -> Arch {
        Arch::from_windows_env(self.processor_architecture.as_deref())
    }
}

fn read_kernel_release() -> Option<String> {
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_beats_config_beats_default() {
        let fallbacks = ToolchainSettings {
            cc: Some("clang".to_string()),
            cxx: Some("clang++".to_string()),
            pkg_config: None,
        };
        let host = HostEnv::from_lookup(lookup_from(&[("CC", "gcc-13")]), &fallbacks, Os::Linux);
        assert_eq!(host.cc, "gcc-13");
        assert_eq!(host.cxx, "clang++");
        assert_eq!(host.pkg_config, "pkg-config");
        assert_eq!(host.host_compiler(), "gcc-13");
    }

    #[test]
    fn test_mac_defaults() {
        let host = HostEnv::from_lookup(lookup_from(&[]), &ToolchainSettings::default(), Os::Mac);
        assert_eq!(host.cc, "cc");
        assert_eq!(host.cxx, "c++");
    }

    #[test]
    fn test_windows_arch_prefers_wow64_variable() {
        let host = HostEnv::from_lookup(
            lookup_from(&[
                ("PROCESSOR_ARCHITECTURE", "x86"),
                ("PROCESSOR_ARCHITEW6432", "AMD64"),
            ]),
            &ToolchainSettings::default(),
            Os::Win,
        );
        assert!(!host.can_probe());
        assert_eq!(host.env_arch(), Arch::X64);
    }
}
