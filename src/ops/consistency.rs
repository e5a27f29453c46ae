//! Cross-checks between installer paths and generated properties.
//!
//! The installer knows where a library version will be installed; the
//! properties file must point compilers at the same place.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::installer::{parse_install_destination, parse_list_paths_destination, CeInstall};
use crate::ops::errors::WizardError;
use crate::util::fs;

/// Result of checking one library version against its properties files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheck {
    /// Every file references the destination
    Consistent { destination: String },
    /// The installer output named no destination
    Skipped,
}

/// `libs.<id>.versions.<v>.version=<version>` with the dots removed from `<v>`.
pub fn version_entry(library_id: &str, version: &str) -> String {
    format!(
        "libs.{}.versions.{}.version={}",
        library_id,
        version.replace('.', ""),
        version
    )
}

/// Whether `text` references `destination` for this library version.
///
/// Accepts the exact path, the path with a dot-less version component, or
/// the library's version entry for properties that predate the path.
pub fn properties_reference(text: &str, destination: &str, library_id: &str, version: &str) -> bool {
    if text.contains(destination) {
        return true;
    }

    let dotless = destination.replace(
        &format!("/{}", version),
        &format!("/{}", version.replace('.', "")),
    );
    if text.contains(&dotless) {
        tracing::debug!("found dot-less path {}", dotless);
        return true;
    }

    let entry = version_entry(library_id, version);
    if text.contains(&entry) {
        tracing::info!("path not listed, but {} exists", entry);
        return true;
    }

    false
}

/// Check every file in `files` against `destination`.
pub fn ensure_referenced(
    files: &[PathBuf],
    destination: &str,
    library_id: &str,
    version: &str,
) -> Result<()> {
    for file in files {
        if !file.exists() {
            tracing::warn!("{} not found, skipping path check", file.display());
            continue;
        }

        let text = fs::read_to_string(file)?;
        if !properties_reference(&text, destination, library_id, version) {
            return Err(WizardError::PropertiesInconsistent {
                path: file.clone(),
                destination: destination.to_string(),
                version_entry: version_entry(library_id, version),
            }
            .into());
        }
    }
    Ok(())
}

/// Ask the installer where a version lives and check the properties agree.
///
/// Output the destination cannot be read from skips the check with a warning.
pub fn check_library_paths(
    installer: &CeInstall,
    language_dir: &str,
    files: &[PathBuf],
    library_id: &str,
    version: &str,
) -> Result<PathCheck> {
    tracing::info!("Checking paths for {} {}", library_id, version);
    let output = installer
        .list_paths(library_id, version)
        .map_err(WizardError::from)?;

    let Some(destination) = parse_list_paths_destination(&output, language_dir) else {
        tracing::warn!("could not parse destination from list-paths output, skipping path check");
        tracing::debug!("list-paths output: {:?}", output);
        return Ok(PathCheck::Skipped);
    };

    tracing::info!("Library destination path: {}", destination);
    ensure_referenced(files, &destination, library_id, version)?;
    Ok(PathCheck::Consistent { destination })
}

/// Install a version for real and check the properties point at the result.
pub fn run_install_test(
    installer: &CeInstall,
    install_root: &Path,
    files: &[PathBuf],
    library_id: &str,
    version: &str,
) -> Result<String> {
    if !install_root.is_dir() {
        return Err(WizardError::InstallRootMissing.into());
    }

    tracing::info!("Testing installation of {} {}", library_id, version);
    let output = installer
        .install_force(library_id, version)
        .map_err(WizardError::from)?;

    let destination =
        parse_install_destination(&output).ok_or(WizardError::NoInstallDestination)?;
    tracing::info!("Installation destination: {}", destination);

    ensure_referenced(files, &destination, library_id, version)?;
    Ok(destination)
}
