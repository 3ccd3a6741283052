//! Architecture, platform flavor and byte order tags.

use std::fmt;

/// Host architecture tags understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Ia32,
    X64,
    Arm,
    Arm64,
    Ppc64,
    S390,
    S390x,
}

impl Arch {
    /// Baseline tag when nothing more specific is detected.
    pub const DEFAULT: Arch = Arch::Ia32;

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Ia32 => "ia32",
            Arch::X64 => "x64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Ppc64 => "ppc64",
            Arch::S390 => "s390",
            Arch::S390x => "s390x",
        }
    }

    /// Map the Windows `PROCESSOR_ARCHITECTURE` value to a tag.
    pub fn from_windows_env(value: Option<&str>) -> Arch {
        match value {
            Some("AMD64") => Arch::X64,
            Some("x86") => Arch::Ia32,
            Some("arm") => Arch::Arm,
            _ => Arch::DEFAULT,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalize a user-supplied target CPU name.
///
/// `x86` becomes `ia32` and `x86_64` becomes `x64`; every other name is
/// returned unchanged.
pub fn normalize_arch(name: &str) -> &str {
    match name {
        "x86" => "ia32",
        "x86_64" => "x64",
        other => other,
    }
}

/// Target operating system flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Win,
    Mac,
    Linux,
    Android,
    Solaris,
    FreeBsd,
    OpenBsd,
    Aix,
}

impl Os {
    /// Parse a `--dest-os` value.
    pub fn parse(s: &str) -> Option<Os> {
        match s {
            "win" => Some(Os::Win),
            "mac" => Some(Os::Mac),
            "linux" => Some(Os::Linux),
            "android" => Some(Os::Android),
            "solaris" => Some(Os::Solaris),
            "freebsd" => Some(Os::FreeBsd),
            "openbsd" => Some(Os::OpenBsd),
            "aix" => Some(Os::Aix),
            _ => None,
        }
    }

    /// Flavor of the machine running preconf.
    pub fn host() -> Os {
        match std::env::consts::OS {
            "windows" => Os::Win,
            "macos" | "ios" => Os::Mac,
            "android" => Os::Android,
            "solaris" | "illumos" => Os::Solaris,
            "freebsd" => Os::FreeBsd,
            "openbsd" => Os::OpenBsd,
            "aix" => Os::Aix,
            _ => Os::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Win => "win",
            Os::Mac => "mac",
            Os::Linux => "linux",
            Os::Android => "android",
            Os::Solaris => "solaris",
            Os::FreeBsd => "freebsd",
            Os::OpenBsd => "openbsd",
            Os::Aix => "aix",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte order, rendered as the single letter used in ICU data file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn host() -> Endianness {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// `'l'` or `'b'`.
    pub fn letter(&self) -> char {
        match self {
            Endianness::Little => 'l',
            Endianness::Big => 'b',
        }
    }

    /// `"little"` or `"big"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_arch_aliases() {
        assert_eq!(normalize_arch("x86"), "ia32");
        assert_eq!(normalize_arch("x86_64"), "x64");
        assert_eq!(normalize_arch("x64"), "x64");
        assert_eq!(normalize_arch("mips64el"), "mips64el");
        assert_eq!(normalize_arch(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["x86", "x86_64", "arm", "ppc64", "riscv64"] {
            let once = normalize_arch(name);
            assert_eq!(normalize_arch(once), once);
        }
    }

    #[test]
    fn test_windows_env_mapping() {
        assert_eq!(Arch::from_windows_env(Some("AMD64")), Arch::X64);
        assert_eq!(Arch::from_windows_env(Some("x86")), Arch::Ia32);
        assert_eq!(Arch::from_windows_env(Some("arm")), Arch::Arm);
        assert_eq!(Arch::from_windows_env(Some("IA64")), Arch::Ia32);
        assert_eq!(Arch::from_windows_env(None), Arch::Ia32);
    }

    #[test]
    fn test_os_parse_round_trips() {
        for name in ["win", "mac", "linux", "android", "solaris", "freebsd", "openbsd", "aix"] {
            assert_eq!(Os::parse(name).unwrap().as_str(), name);
        }
        assert!(Os::parse("beos").is_none());
    }
}
