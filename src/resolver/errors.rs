//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while resolving versions or modules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("version(s) not found for {origin}: {}", versions.join(", "))]
    MissingVersions {
        origin: String,
        versions: Vec<String>,
    },

    #[error("no module found for `{module}` at {version}")]
    ModuleNotFound { module: String, version: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::MissingVersions { origin, versions } => {
                let mut diag = Diagnostic::error(format!(
                    "{} version(s) could not be verified for `{}`",
                    versions.len(),
                    origin
                ));

                for version in versions {
                    diag = diag.with_context(format!(
                        "neither `{}` nor `v{}` exists upstream",
                        version.trim_start_matches('v'),
                        version.trim_start_matches('v')
                    ));
                }

                diag.with_suggestion(suggestions::CHECK_TAGS)
                    .with_suggestion(suggestions::NETWORK)
            }

            ResolveError::ModuleNotFound { module, version } => {
                Diagnostic::error(format!("module proxy has no `{}` at {}", module, version))
                    .with_context("no parent path is a module at this version either")
                    .with_suggestion("Check the module path against its go.mod")
                    .with_suggestion(suggestions::NETWORK)
            }
        }
    }
}
