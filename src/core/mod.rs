//! Core value types: options, host facts, version tuples and the descriptor.

pub mod arch;
pub mod descriptor;
pub mod host;
pub mod layout;
pub mod options;
pub mod version;

pub use arch::{normalize_arch, Arch, Endianness, Os};
pub use descriptor::{ConfigDescriptor, Fragment, IcuConfig, Value};
pub use host::HostEnv;
pub use layout::ProjectLayout;
pub use options::{Dependency, IntlMode, Options};
pub use version::{AsmVersion, CompilerVersion};
