//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Read a file, apply a text transformation, and write it back if it changed.
///
/// Returns `true` when the file was rewritten.
pub fn update_file<F>(path: &Path, edit: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<String>,
{
    let current = read_to_string(path)?;
    let updated = edit(&current)?;

    if updated == current {
        return Ok(false);
    }

    write_string(path, &updated)?;
    Ok(true)
}

/// A scratch directory removed on drop unless asked to be kept.
///
/// Used for throwaway clones; `keep` retains the directory for debugging.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    keep: bool,
}

impl ScratchDir {
    /// Create a new scratch directory with the given name prefix.
    pub fn new(prefix: &str, keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .context("failed to create temporary directory")?;

        Ok(ScratchDir {
            dir: Some(dir),
            keep,
        })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.keep {
            return;
        }

        if let Some(dir) = self.dir.take() {
            #[allow(deprecated)]
            let kept: PathBuf = dir.into_path();
            tracing::info!("Keeping temporary directory {}", kept.display());
        }
    }
}
