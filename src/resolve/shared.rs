//! Shared (system) versus bundled dependencies.

use crate::core::arch::Os;
use crate::core::descriptor::Fragment;
use crate::core::options::{Dependency, SharedLibOptions};

use super::pkg_config::PackageQuery;

/// How one dependency is linked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: &'static str,
    pub shared: bool,
    pub include_dirs: Vec<String>,
    /// Library path flags, emitted before `link_flags`.
    pub libpath_flags: Vec<String>,
    pub link_flags: Vec<String>,
}

impl DependencySpec {
    /// Descriptor fragment for this dependency.
    ///
    /// Path flags always precede name flags in `libraries`.
    pub fn to_fragment(&self) -> Fragment {
        let mut fragment = Fragment::new();
        fragment.set(&format!("shared_{}", self.name), self.shared);
        for dir in &self.include_dirs {
            fragment.include_dir(dir.clone());
        }
        for flag in self.libpath_flags.iter().chain(&self.link_flags) {
            fragment.library(flag.clone());
        }
        fragment
    }
}

/// Resolve `dep` from the user's request, consulting `packages` only for
/// values the user left unset.
pub fn resolve_dependency(
    dep: Dependency,
    request: &SharedLibOptions,
    packages: &dyn PackageQuery,
    flavor: Os,
) -> DependencySpec {
    let mut spec = DependencySpec {
        name: dep.var_name(),
        shared: request.shared,
        ..Default::default()
    };
    if !request.shared {
        return spec;
    }

    let info = packages.query(dep.pkg_config_name());

    spec.include_dirs = match request.includes {
        Some(ref dir) => vec![dir.clone()],
        None => info.include_dirs(),
    };

    spec.libpath_flags = match request.libpath {
        Some(ref path) if flavor == Os::Win => vec![format!("/LIBPATH:{}", path)],
        Some(ref path) => vec![format!("-L{}", path)],
        None => info.libpath_flags(),
    };

    spec.link_flags = match request.libname {
        Some(ref names) => names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!("-l{}", n))
            .collect(),
        None => {
            let from_pkg = info.lib_flags();
            if from_pkg.is_empty() {
                dep.default_libnames()
                    .iter()
                    .map(|n| format!("-l{}", n))
                    .collect()
            } else {
                from_pkg
            }
        }
    };

    tracing::debug!(
        "shared {}: includes {:?}, libraries {:?} {:?}",
        spec.name,
        spec.include_dirs,
        spec.libpath_flags,
        spec.link_flags
    );
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Value;
    use crate::resolve::pkg_config::PackageInfo;
    use crate::test_support::FakePackages;

    fn shared() -> SharedLibOptions {
        SharedLibOptions {
            shared: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_bundled_dependency_has_no_paths() {
        let spec = resolve_dependency(
            Dependency::Zlib,
            &SharedLibOptions::default(),
            &FakePackages::new(),
            Os::Linux,
        );
        assert!(!spec.shared);
        let fragment = spec.to_fragment();
        assert_eq!(fragment.get("shared_zlib"), Some(&Value::from(false)));
        assert!(fragment.include_dirs.is_empty());
        assert!(fragment.libraries.is_empty());
    }

    #[test]
    fn test_user_values_win_over_pkg_config() {
        let packages = FakePackages::new().with(
            "libuv",
            PackageInfo {
                libs: Some("-luv -lpthread".to_string()),
                cflags: Some("-I/usr/include/uv".to_string()),
                libpath: Some("-L/usr/lib/uv".to_string()),
                version: Some("1.44.2".to_string()),
            },
        );
        let request = SharedLibOptions {
            shared: true,
            includes: Some("/opt/uv/include".to_string()),
            libpath: Some("/opt/uv/lib".to_string()),
            libname: Some("uv_a,dl".to_string()),
        };

        let fragment =
            resolve_dependency(Dependency::Libuv, &request, &packages, Os::Linux).to_fragment();
        assert_eq!(fragment.include_dirs, ["/opt/uv/include"]);
        assert_eq!(fragment.libraries, ["-L/opt/uv/lib", "-luv_a", "-ldl"]);
    }

    #[test]
    fn test_pkg_config_fills_gaps_with_path_before_names() {
        let packages = FakePackages::new().with(
            "libcares",
            PackageInfo {
                libs: Some("-lcares".to_string()),
                cflags: Some("-I/usr/local/include".to_string()),
                libpath: Some("-L/usr/local/lib".to_string()),
                version: Some("1.19.1".to_string()),
            },
        );

        let fragment =
            resolve_dependency(Dependency::Cares, &shared(), &packages, Os::Linux).to_fragment();
        assert_eq!(fragment.get("shared_cares"), Some(&Value::from(true)));
        assert_eq!(fragment.include_dirs, ["/usr/local/include"]);
        assert_eq!(fragment.libraries, ["-L/usr/local/lib", "-lcares"]);
    }

    #[test]
    fn test_defaults_when_pkg_config_unavailable() {
        let spec = resolve_dependency(Dependency::OpenSsl, &shared(), &FakePackages::new(), Os::Linux);
        assert!(spec.include_dirs.is_empty());
        assert!(spec.libpath_flags.is_empty());
        assert_eq!(spec.link_flags, ["-lcrypto", "-lssl"]);
    }

    #[test]
    fn test_windows_libpath_flag() {
        let request = SharedLibOptions {
            shared: true,
            libpath: Some("C:\\zlib\\lib".to_string()),
            ..Default::default()
        };
        let spec = resolve_dependency(Dependency::Zlib, &request, &FakePackages::new(), Os::Win);
        assert_eq!(spec.libpath_flags, ["/LIBPATH:C:\\zlib\\lib"]);
        assert_eq!(spec.link_flags, ["-lz"]);
    }
}
