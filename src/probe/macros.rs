//! Predefined macro tables from `cc -dM -E -`.

use std::collections::HashMap;

use crate::core::arch::Arch;
use crate::core::version::CompilerVersion;
use crate::util::process::split_command_line;

use super::CompilerFamily;

/// Case-sensitive map of predefined macro names to their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    defines: HashMap<String, String>,
}

/// Macro markers checked in order. A plain `__s390__` match keeps looking,
/// since 64-bit s390 compilers define both markers.
const ARCH_MARKERS: [(&str, Arch); 8] = [
    ("__aarch64__", Arch::Arm64),
    ("__arm__", Arch::Arm),
    ("__i386__", Arch::Ia32),
    ("__PPC64__", Arch::Ppc64),
    ("__PPC__", Arch::Ppc64),
    ("__x86_64__", Arch::X64),
    ("__s390__", Arch::S390),
    ("__s390x__", Arch::S390x),
];

impl MacroTable {
    /// Parse preprocessor output of the form `#define NAME VALUE`.
    ///
    /// Lines with fewer than three words (for example `#define FOO` with an
    /// empty value) are skipped. Quoted values are unquoted.
    pub fn parse(output: &str) -> Self {
        let defines = output
            .lines()
            .filter_map(|line| {
                let mut words = split_command_line(line).into_iter().skip(1);
                let name = words.next()?;
                let value = words.next()?;
                Some((name, value))
            })
            .collect();

        MacroTable { defines }
    }

    /// Build from explicit pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        MacroTable {
            defines: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }

    /// Numeric value of a macro, or zero when absent or not a number.
    pub fn get_or_zero(&self, name: &str) -> u32 {
        self.get(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Whether a macro is defined to something other than `0`.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v != "0")
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Clang defines `__clang__`; everything else is treated as GCC.
    pub fn family(&self) -> CompilerFamily {
        if self.get("__clang__") == Some("1") {
            CompilerFamily::Clang
        } else {
            CompilerFamily::Gcc
        }
    }

    /// Three-part version from the family-specific macros. Missing parts
    /// default to zero.
    pub fn version(&self) -> CompilerVersion {
        let [major, minor, patch] = match self.family() {
            CompilerFamily::Clang => [
                "__clang_major__",
                "__clang_minor__",
                "__clang_patchlevel__",
            ],
            CompilerFamily::Gcc => ["__GNUC__", "__GNUC_MINOR__", "__GNUC_PATCHLEVEL__"],
        };
        CompilerVersion::new(
            self.get_or_zero(major),
            self.get_or_zero(minor),
            self.get_or_zero(patch),
        )
    }

    /// Target architecture of the compiler.
    pub fn arch(&self) -> Arch {
        let mut arch = Arch::DEFAULT;
        for (marker, candidate) in ARCH_MARKERS {
            if self.is_set(marker) {
                arch = candidate;
                if arch != Arch::S390 {
                    break;
                }
            }
        }
        arch
    }
}
