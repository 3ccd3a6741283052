//! Ordered merge of resolver fragments into the final descriptor.

use crate::core::descriptor::{ConfigDescriptor, Fragment};

/// One fragment per resolver, named by merge position.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    pub toolchain: Fragment,
    /// Plain shared-library dependencies in [`Dependency::PLAIN`] order.
    ///
    /// [`Dependency::PLAIN`]: crate::core::options::Dependency::PLAIN
    pub shared: Vec<Fragment>,
    pub tls: Fragment,
    pub intl: Fragment,
    pub static_linking: Fragment,
    /// Last, since it reads the TLS and Intl outcome.
    pub inspector: Fragment,
}

impl Fragments {
    /// Merge every fragment in order.
    ///
    /// # Panics
    ///
    /// Panics if two resolvers wrote the same variable.
    pub fn assemble(self) -> ConfigDescriptor {
        let mut descriptor = ConfigDescriptor::default();
        descriptor.merge(self.toolchain);
        for fragment in self.shared {
            descriptor.merge(fragment);
        }
        descriptor.merge(self.tls);
        descriptor.merge(self.intl);
        descriptor.merge(self.static_linking);
        descriptor.merge(self.inspector);
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(key: &str, include: &str, lib: &str) -> Fragment {
        let mut f = Fragment::new();
        f.set(key, true);
        f.include_dir(include);
        f.library(lib);
        f
    }

    #[test]
    fn test_merge_order() {
        let fragments = Fragments {
            toolchain: fragment("host_arch", "/sdt", "-a"),
            shared: vec![fragment("shared_zlib", "/zlib", "-lz")],
            tls: fragment("use_openssl", "/zlib", "-lssl"),
            intl: fragment("enable_i18n_support", "/icu", "-licu"),
            static_linking: Fragment::new(),
            inspector: fragment("enable_inspector", "/icu", "-z"),
        };

        let descriptor = fragments.assemble();
        assert_eq!(descriptor.include_dirs, ["/sdt", "/zlib", "/icu"]);
        assert_eq!(descriptor.libraries, ["-a", "-lz", "-lssl", "-licu", "-z"]);
        assert_eq!(descriptor.variables.len(), 5);
    }

    #[test]
    #[should_panic(expected = "written by two resolvers")]
    fn test_duplicate_variable_panics() {
        let fragments = Fragments {
            toolchain: fragment("shared_zlib", "/a", "-a"),
            shared: vec![fragment("shared_zlib", "/b", "-b")],
            ..Default::default()
        };
        fragments.assemble();
    }
}
