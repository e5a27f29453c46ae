//! Errors surfaced by the library-addition flows.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::RequestError;
use crate::installer::{InstallerError, INSTALL_ROOT};
use crate::properties::PropertiesError;
use crate::resolver::ResolveError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Failure of an `add` flow.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Installer(#[from] InstallerError),

    #[error("{}: {source}", path.display())]
    Properties {
        path: PathBuf,
        source: PropertiesError,
    },

    #[error("{} does not reference {destination}", path.display())]
    PropertiesInconsistent {
        path: PathBuf,
        destination: String,
        version_entry: String,
    },

    #[error("{url} is not an fpm package (no fpm.toml at the repository root)")]
    NotFpmPackage { url: String },

    #[error("required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("install test needs {INSTALL_ROOT} to exist")]
    InstallRootMissing,

    #[error("install output did not report a final destination")]
    NoInstallDestination,
}

impl WizardError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            WizardError::Resolve(e) => e.to_diagnostic(),
            WizardError::Installer(e) => e.to_diagnostic(),

            WizardError::Request(e) => Diagnostic::error(e.to_string())
                .with_suggestion("Run `ce-lib-wizard add --help` for the accepted options"),

            WizardError::Properties { path, .. } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion("The file needs a `libs=` line before the tools section"),

            WizardError::PropertiesInconsistent {
                path,
                destination,
                version_entry,
            } => Diagnostic::error("properties file and installer configuration are out of sync")
                .with_location(path)
                .with_context(format!("expected path: {}", destination))
                .with_context(format!("or version entry: {}", version_entry))
                .with_suggestion(suggestions::OUT_OF_SYNC),

            WizardError::NotFpmPackage { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Fortran libraries must be built with fpm"),

            WizardError::MissingFile { path } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion("Check that --main points at a compiler-explorer checkout"),

            WizardError::InstallRootMissing => Diagnostic::error(self.to_string())
                .with_suggestion(format!("sudo mkdir -p {}", INSTALL_ROOT))
                .with_suggestion(format!("sudo chown -R $USER: {}", INSTALL_ROOT)),

            WizardError::NoInstallDestination => Diagnostic::error(self.to_string())
                .with_suggestion(suggestions::INSTALLER_FAILED),
        }
    }
}
