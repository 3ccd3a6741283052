//! Version tuples for compilers and assemblers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A three-part compiler version, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct CompilerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl CompilerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        CompilerVersion {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl From<(u32, u32, u32)> for CompilerVersion {
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        CompilerVersion::new(major, minor, patch)
    }
}

/// A `major.minor` assembler version as reported by `as`, `nasm` or
/// derived from the clang version.
///
/// Compared numerically, so `2.9 < 2.10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsmVersion {
    pub major: u32,
    pub minor: u32,
}

impl AsmVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        AsmVersion { major, minor }
    }
}

impl FromStr for AsmVersion {
    type Err = std::num::ParseIntError;

    /// Parse `"2.23"` or `"3.3.0"`; anything after the minor part is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts.next().unwrap_or_default().parse()?;
        let minor = match parts.next() {
            Some(m) => m.parse()?,
            None => 0,
        };
        Ok(AsmVersion { major, minor })
    }
}

impl fmt::Display for AsmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_lexicographic_order() {
        let a = CompilerVersion::new(5, 4, 0);
        let b = CompilerVersion::new(5, 4, 1);
        let c = CompilerVersion::new(6, 0, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(CompilerVersion::new(5, 3, 9) < b);
        assert!(CompilerVersion::new(10, 0, 0) > CompilerVersion::new(9, 99, 99));
    }

    #[test]
    fn test_asm_version_numeric_compare() {
        let floor: AsmVersion = "2.10".parse().unwrap();
        assert!("2.9".parse::<AsmVersion>().unwrap() < floor);
        assert!("2.30".parse::<AsmVersion>().unwrap() > "2.23".parse().unwrap());
        assert_eq!("3.3.0".parse::<AsmVersion>().unwrap(), AsmVersion::new(3, 3));
        assert!("0".parse::<AsmVersion>().unwrap() < AsmVersion::new(2, 23));
        assert!("abc".parse::<AsmVersion>().is_err());
    }
}
