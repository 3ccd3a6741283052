//! Package metadata queries through `pkg-config`.

use crate::util::process::ProcessBuilder;

/// What the metadata tool reported for one package. Every field is `None`
/// when the tool is unavailable or does not know the package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// `--libs-only-l`, e.g. `-lz`.
    pub libs: Option<String>,
    /// `--cflags-only-I`, e.g. `-I/usr/include/foo`.
    pub cflags: Option<String>,
    /// `--libs-only-L`, e.g. `-L/opt/lib`.
    pub libpath: Option<String>,
    /// `--modversion`, e.g. `73.2`.
    pub version: Option<String>,
}

impl PackageInfo {
    /// Include directories from the `-I` flags.
    pub fn include_dirs(&self) -> Vec<String> {
        self.cflags
            .as_deref()
            .map(|flags| {
                flags
                    .split("-I")
                    .map(str::trim)
                    .filter(|dir| !dir.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Library path flags, one entry per flag.
    pub fn libpath_flags(&self) -> Vec<String> {
        split_flags(self.libpath.as_deref())
    }

    /// Library name flags, one entry per flag.
    pub fn lib_flags(&self) -> Vec<String> {
        split_flags(self.libs.as_deref())
    }

    /// Leading component of the version string.
    pub fn major_version(&self) -> Option<u32> {
        self.version.as_deref()?.split('.').next()?.trim().parse().ok()
    }
}

fn split_flags(flags: Option<&str>) -> Vec<String> {
    flags
        .map(|f| f.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Answers package metadata questions.
pub trait PackageQuery {
    fn query(&self, package: &str) -> PackageInfo;
}

/// `pkg-config` (or whatever `PKG_CONFIG` names).
#[derive(Debug, Clone)]
pub struct PkgConfig {
    command: String,
}

impl PkgConfig {
    pub fn new(command: impl Into<String>) -> Self {
        PkgConfig {
            command: command.into(),
        }
    }

    /// Run one query. `Err` only when the tool itself cannot be started.
    fn run(&self, flag: &str, package: &str) -> anyhow::Result<Option<String>> {
        let output = ProcessBuilder::from_command_line(&self.command)
            .args(["--silence-errors", flag, package])
            .exec()?;

        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}

impl PackageQuery for PkgConfig {
    fn query(&self, package: &str) -> PackageInfo {
        let mut answers = Vec::with_capacity(4);
        for flag in ["--libs-only-l", "--cflags-only-I", "--libs-only-L", "--modversion"] {
            match self.run(flag, package) {
                Ok(answer) => answers.push(answer),
                Err(e) => {
                    tracing::debug!("`{}` unavailable: {:#}", self.command, e);
                    return PackageInfo::default();
                }
            }
        }

        let mut answers = answers.into_iter();
        let info = PackageInfo {
            libs: answers.next().flatten(),
            cflags: answers.next().flatten(),
            libpath: answers.next().flatten(),
            version: answers.next().flatten(),
        };
        tracing::debug!("pkg-config {}: {:?}", package, info);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_dirs_split_on_dash_i() {
        let info = PackageInfo {
            cflags: Some("-I/usr/include/uv -I/opt/uv/include ".to_string()),
            ..Default::default()
        };
        assert_eq!(info.include_dirs(), ["/usr/include/uv", "/opt/uv/include"]);
        assert!(PackageInfo::default().include_dirs().is_empty());
    }

    #[test]
    fn test_major_version() {
        let info = PackageInfo {
            version: Some("73.2".to_string()),
            ..Default::default()
        };
        assert_eq!(info.major_version(), Some(73));

        let bogus = PackageInfo {
            version: Some("unknown".to_string()),
            ..Default::default()
        };
        assert_eq!(bogus.major_version(), None);
    }

    #[test]
    fn test_missing_tool_reports_nothing() {
        let pkg = PkgConfig::new("preconf-no-such-pkg-config");
        assert_eq!(pkg.query("zlib"), PackageInfo::default());
    }
}
