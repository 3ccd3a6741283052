//! `preconf probe` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ProbeArgs;
use preconf::ops::{format_report, probe_host};
use preconf::util::diagnostic::emit;

pub fn execute(_args: ProbeArgs, root: &Path, color: bool) -> Result<()> {
    let report = match probe_host(root) {
        Ok(report) => report,
        Err(e) => {
            emit(&e.to_diagnostic(), color);
            std::process::exit(1);
        }
    };

    print!("{}", format_report(&report));
    Ok(())
}
