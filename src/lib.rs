//! preconf - pre-build configuration resolver
//!
//! Probes the host C/C++ toolchain, resolves optional runtime features
//! (TLS, Intl, shared system libraries, profiling) against user options,
//! and emits a configuration descriptor for a build-file generator.

pub mod core;
pub mod error;
pub mod icu;
pub mod ops;
pub mod probe;
pub mod resolve;
pub mod util;

/// Fakes and fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::descriptor::{ConfigDescriptor, IcuConfig};
pub use core::options::Options;
pub use error::{ConfigureError, ConfigureResult};
pub use resolve::Resolution;
