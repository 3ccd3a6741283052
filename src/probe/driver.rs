//! The narrow seam between probing logic and real subprocesses.

use std::io;

use crate::error::{ConfigureError, ConfigureResult};
use crate::util::process::{find_executable, ProcessBuilder};

use super::macros::MacroTable;

/// Runs compilers and assemblers on behalf of the probe.
///
/// The host implementation spawns processes; tests substitute canned
/// answers. A driver for a compiler with a different macro-dump syntax only
/// needs to change how [`predefined_macros`](Self::predefined_macros)
/// parses its output.
pub trait CompilerDriver {
    /// Predefined macros of `compiler` (a command line, e.g. `"ccache gcc"`).
    fn predefined_macros(&self, compiler: &str) -> ConfigureResult<MacroTable>;

    /// Version banner printed by the GNU assembler behind `compiler`.
    fn gas_banner(&self, compiler: &str) -> io::Result<String>;

    /// Output of `nasm -v`.
    fn nasm_banner(&self, nasm: &str) -> io::Result<String>;
}

/// Driver that runs the real tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDriver;

impl CompilerDriver for HostDriver {
    fn predefined_macros(&self, compiler: &str) -> ConfigureResult<MacroTable> {
        // Empty stdin: only the compiler's built-in defines are printed.
        let cmd = ProcessBuilder::from_command_line(compiler).args(["-dM", "-E", "-"]);
        tracing::debug!("probing `{}`", cmd.display_command());

        let output = cmd.output().map_err(|e| {
            let detail = if e.kind() == io::ErrorKind::NotFound {
                format!("`{}` was not found", cmd.get_program().display())
            } else {
                format!("call to `{}` got {}", cmd.display_command(), e)
            };
            ConfigureError::Toolchain {
                command: compiler.to_string(),
                detail,
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConfigureError::Toolchain {
                command: compiler.to_string(),
                detail: format!(
                    "call to `{}` errored:\n=== stdout: ===\n{}\n=== stderr: ===\n{}",
                    cmd.display_command(),
                    stdout,
                    stderr
                ),
            });
        }

        Ok(MacroTable::parse(&stdout))
    }

    fn gas_banner(&self, compiler: &str) -> io::Result<String> {
        let output = ProcessBuilder::from_command_line(compiler)
            .args(["-Wa,-v", "-c", "-o", "/dev/null", "-x", "assembler", "/dev/null"])
            .env("LC_ALL", "C")
            .output()?;
        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }

    fn nasm_banner(&self, nasm: &str) -> io::Result<String> {
        let program = find_executable(nasm).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("`{}` is not on PATH", nasm))
        })?;
        let output = ProcessBuilder::new(program).arg("-v").output()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
