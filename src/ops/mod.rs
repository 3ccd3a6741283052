//! High-level operations.
//!
//! This module contains the implementation of preconf commands.

pub mod configure;
pub mod probe;

pub use configure::{
    configure, configure_with, resolve_all, write_outputs, Collaborators, ConfigureOptions,
    ConfigureReport, CONFIG_FILE, ICU_CONFIG_FILE,
};
pub use probe::{format_report, probe_host, probe_with, ProbeReport};
