//! Test doubles for the seams where preconf talks to the outside world.
//!
//! Compilers, pkg-config and the network are replaced by fakes that answer
//! from memory and record how they were used.
//!
//! # Example
//!
//! ```rust,ignore
//! use preconf::test_support::{FakeDriver, FakeFetcher};
//!
//! let driver = FakeDriver::gcc(CompilerVersion::new(12, 2, 0), "__x86_64__");
//! let calls = driver.calls();
//! let mut probe = CapabilityProbe::new(Box::new(driver));
//! probe.probe("gcc")?;
//! assert_eq!(calls.get(), 1);
//! ```

pub mod fixtures;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use crate::core::version::CompilerVersion;
use crate::error::ConfigureResult;
use crate::icu::Fetcher;
use crate::probe::{CompilerDriver, MacroTable};
use crate::resolve::{PackageInfo, PackageQuery};

pub use fixtures::*;

/// Banner of a binutils release new enough for every assembler floor.
pub const GAS_BANNER: &str =
    "GNU assembler version 2.38 (x86_64-linux-gnu) using BFD version (GNU Binutils) 2.38";

/// Compiler driver answering from a fixed macro table.
#[derive(Debug, Clone)]
pub struct FakeDriver {
    macros: MacroTable,
    gas_banner: String,
    nasm_banner: Option<String>,
    calls: Rc<Cell<usize>>,
}

impl FakeDriver {
    /// A GCC of `version` targeting the architecture `marker` stands for.
    pub fn gcc(version: CompilerVersion, marker: &str) -> Self {
        let (major, minor, patch) = version_parts(version);
        FakeDriver::from_pairs(&[
            ("__GNUC__", major.as_str()),
            ("__GNUC_MINOR__", minor.as_str()),
            ("__GNUC_PATCHLEVEL__", patch.as_str()),
            (marker, "1"),
        ])
    }

    /// A clang of `version`. Like the real thing, it also claims GCC 4.2.1.
    pub fn clang(version: CompilerVersion, marker: &str) -> Self {
        let (major, minor, patch) = version_parts(version);
        FakeDriver::from_pairs(&[
            ("__clang__", "1"),
            ("__clang_major__", major.as_str()),
            ("__clang_minor__", minor.as_str()),
            ("__clang_patchlevel__", patch.as_str()),
            ("__GNUC__", "4"),
            ("__GNUC_MINOR__", "2"),
            ("__GNUC_PATCHLEVEL__", "1"),
            (marker, "1"),
        ])
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        FakeDriver {
            macros: MacroTable::from_pairs(pairs.iter().copied()),
            gas_banner: GAS_BANNER.to_string(),
            nasm_banner: None,
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Replace what `as -v` prints.
    pub fn with_gas_banner(mut self, banner: &str) -> Self {
        self.gas_banner = banner.to_string();
        self
    }

    /// Make NASM available with the given `nasm -v` output.
    pub fn with_nasm_banner(mut self, banner: &str) -> Self {
        self.nasm_banner = Some(banner.to_string());
        self
    }

    /// Shared counter of macro dumps requested from this driver.
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

fn version_parts(version: CompilerVersion) -> (String, String, String) {
    (
        version.major.to_string(),
        version.minor.to_string(),
        version.patch.to_string(),
    )
}

impl CompilerDriver for FakeDriver {
    fn predefined_macros(&self, _compiler: &str) -> ConfigureResult<MacroTable> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.macros.clone())
    }

    fn gas_banner(&self, _compiler: &str) -> io::Result<String> {
        Ok(self.gas_banner.clone())
    }

    fn nasm_banner(&self, nasm: &str) -> io::Result<String> {
        self.nasm_banner.clone().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}: not found", nasm))
        })
    }
}

/// pkg-config stand-in. Unknown packages get an all-`None` answer, the
/// same as a missing tool.
#[derive(Debug, Clone, Default)]
pub struct FakePackages {
    packages: HashMap<String, PackageInfo>,
}

impl FakePackages {
    pub fn new() -> Self {
        FakePackages::default()
    }

    pub fn with(mut self, package: &str, info: PackageInfo) -> Self {
        self.packages.insert(package.to_string(), info);
        self
    }
}

impl PackageQuery for FakePackages {
    fn query(&self, package: &str) -> PackageInfo {
        self.packages.get(package).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum FetchBehavior {
    Offline,
    Serve(Vec<u8>),
}

/// Fetcher that records every URL it is asked for.
#[derive(Debug, Clone)]
pub struct FakeFetcher {
    behavior: FetchBehavior,
    requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    /// Every fetch fails.
    pub fn offline() -> Self {
        FakeFetcher {
            behavior: FetchBehavior::Offline,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Every fetch succeeds with `body`.
    pub fn serving(body: Vec<u8>) -> Self {
        FakeFetcher {
            behavior: FetchBehavior::Serve(body),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests.borrow_mut().push(url.to_string());
        match &self.behavior {
            FetchBehavior::Offline => bail!("network is unreachable: {}", url),
            FetchBehavior::Serve(body) => {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(dest, body)
                    .with_context(|| format!("failed to write {}", dest.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_driver_counts_calls() {
        let driver = FakeDriver::gcc(CompilerVersion::new(9, 4, 0), "__aarch64__");
        let calls = driver.calls();
        let table = driver.predefined_macros("gcc").unwrap();
        assert_eq!(table.get("__GNUC__"), Some("9"));
        assert_eq!(calls.get(), 1);
        assert!(driver.nasm_banner("nasm").is_err());
    }

    #[test]
    fn test_fake_fetcher_records_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::serving(b"body".to_vec());
        fetcher
            .fetch("https://example.com/a.tgz", &tmp.path().join("x/a.tgz"))
            .unwrap();
        assert_eq!(std::fs::read(tmp.path().join("x/a.tgz")).unwrap(), b"body");

        let offline = FakeFetcher::offline();
        assert!(offline.fetch("https://example.com/b.tgz", tmp.path()).is_err());
        assert_eq!(offline.requests(), ["https://example.com/b.tgz"]);
    }
}
