//! Fatal error taxonomy for a configure run.
//!
//! Anything that reaches the caller as a [`ConfigureError`] aborts the run
//! before a descriptor is written. Recoverable findings are recorded in
//! [`Warnings`](crate::util::Warnings) instead.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias used across the resolution engine.
pub type ConfigureResult<T> = Result<T, ConfigureError>;

/// A fatal configure error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigureError {
    /// Conflicting or unsupported option combination.
    #[error("{message}")]
    #[diagnostic(code(preconf::validation))]
    Validation {
        message: String,
        hint: Option<String>,
    },

    /// The compiler could not be run or its output was unusable.
    #[error("no acceptable C compiler found: `{command}`")]
    #[diagnostic(code(preconf::toolchain))]
    Toolchain { command: String, detail: String },

    /// Bundled metadata cannot be used to verify a download.
    #[error("cannot verify integrity of {subject}")]
    #[diagnostic(code(preconf::integrity))]
    Integrity { subject: String, detail: String },

    /// A dependency is present but older than the supported floor.
    #[error("{component} v{found} is too old, v{required}.x or later is required")]
    #[diagnostic(code(preconf::version))]
    Version {
        component: String,
        found: String,
        required: u32,
    },

    /// No usable ICU source tree after all acquisition steps.
    #[error("cannot build Intl without ICU in {}", path.display())]
    #[diagnostic(code(preconf::icu::source_not_found))]
    IcuSourceNotFound { path: PathBuf },

    /// The ICU tree exists but lacks a usable data file or version header.
    #[error("{message}")]
    #[diagnostic(code(preconf::icu::missing_data))]
    MissingIcuData { message: String, path: PathBuf },

    /// Filesystem or network plumbing failure.
    #[error(transparent)]
    #[diagnostic(code(preconf::io))]
    Io(#[from] anyhow::Error),
}

impl ConfigureError {
    /// Shorthand for a validation error without a hint.
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigureError::Validation {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a validation error with a suggested fix.
    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigureError::Validation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Whether this is a user-facing option conflict.
    pub fn is_validation(&self) -> bool {
        matches!(self, ConfigureError::Validation { .. })
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_context(format!("code: {}", code));
        }

        match self {
            ConfigureError::Validation { hint, .. } => {
                if let Some(hint) = hint {
                    diag = diag.with_suggestion(hint.clone());
                }
            }

            ConfigureError::Toolchain { detail, .. } => {
                diag = diag
                    .with_context(detail.clone())
                    .with_suggestion(suggestions::SET_CC);
            }

            ConfigureError::Integrity { detail, .. } => {
                diag = diag.with_context(detail.clone());
            }

            ConfigureError::Version { .. } => {
                diag = diag.with_suggestion(suggestions::DISABLE_INTL);
            }

            ConfigureError::IcuSourceNotFound { .. } => {
                diag = diag
                    .with_suggestion("pass `--with-icu-source` pointing at an icu4c tree or archive")
                    .with_suggestion(suggestions::DISABLE_INTL);
            }

            ConfigureError::MissingIcuData { path, .. } => {
                diag = diag
                    .with_location(path.clone())
                    .with_suggestion(suggestions::DISABLE_INTL);
            }

            ConfigureError::Io(err) => {
                for cause in err.chain().skip(1) {
                    diag = diag.with_context(cause.to_string());
                }
            }
        }

        diag
    }
}
