//! Assembler version detection.
//!
//! The bundled TLS library only assembles its AVX2 code paths with a recent
//! enough assembler, so configure records which one is available.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::version::AsmVersion;

static GAS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^GNU assembler version ([2-9]\.[0-9]+)").unwrap());

static NASM_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^NASM version ([2-9]\.[0-9][0-9]+)").unwrap());

/// Which assembler a version belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerKind {
    /// GNU `as`, reached through the C compiler.
    Gas,
    /// Clang's integrated assembler; version is the clang version.
    Llvm,
    /// NASM on Windows.
    Nasm,
}

impl AssemblerKind {
    /// Descriptor variable carrying this version.
    pub fn var_name(&self) -> &'static str {
        match self {
            AssemblerKind::Gas => "gas_version",
            AssemblerKind::Llvm => "llvm_version",
            AssemblerKind::Nasm => "nasm_version",
        }
    }

    /// Lowest version that can build the TLS library's AVX2 assembly.
    pub fn tls_floor(&self) -> AsmVersion {
        match self {
            AssemblerKind::Gas => AsmVersion::new(2, 23),
            AssemblerKind::Llvm => AsmVersion::new(3, 3),
            AssemblerKind::Nasm => AsmVersion::new(2, 10),
        }
    }
}

/// A detected assembler and its version string (`"0"` when unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerInfo {
    pub kind: AssemblerKind,
    pub version: String,
}

impl AssemblerInfo {
    pub fn new(kind: AssemblerKind, version: impl Into<String>) -> Self {
        AssemblerInfo {
            kind,
            version: version.into(),
        }
    }

    /// Whether no usable version was found.
    pub fn is_unknown(&self) -> bool {
        self.version == "0"
    }

    /// Whether this assembler clears the TLS assembly floor.
    pub fn supports_tls_asm(&self) -> bool {
        self.version
            .parse::<AsmVersion>()
            .map(|v| v >= self.kind.tls_floor())
            .unwrap_or(false)
    }
}

/// Extract `major.minor` from `as -v` output.
pub fn parse_gas_version(banner: &str) -> Option<String> {
    GAS_VERSION
        .captures(banner)
        .map(|caps| caps[1].to_string())
}

/// Extract `major.minor` from `nasm -v` output.
pub fn parse_nasm_version(banner: &str) -> Option<String> {
    NASM_VERSION
        .captures(banner)
        .map(|caps| caps[1].to_string())
}
