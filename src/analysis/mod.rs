//! Repository inspection.
//!
//! Shallow-clones a source repository into a scratch directory and records
//! the structural facts that library type detection needs.

pub mod cmake;

use std::path::Path;

use anyhow::Result;

use crate::sources::git::shallow_clone;
use crate::util::fs::ScratchDir;

/// Name fragments that mark a target as not part of the library proper.
const NON_LIBRARY_MARKERS: &[&str] = &[
    "test",
    "example",
    "benchmark",
    "bench",
    "mock",
    "doc",
    "tutorial",
    "sample",
];

/// Facts about a cloned source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryAnalysis {
    /// A `CMakeLists.txt` exists at the root
    pub has_manifest: bool,

    /// Every target CMake reported, or `None` if listing failed
    pub targets: Option<Vec<String>>,

    /// Targets left after dropping tests, examples and friends
    pub main_targets: Vec<String>,
}

impl RepositoryAnalysis {
    /// Targets the installer should link against.
    pub fn link_targets(&self) -> &[String] {
        &self.main_targets
    }
}

/// Whether a target name looks like part of the library itself.
///
/// Case-insensitive substring test, so plurals and affixed forms
/// (`tests`, `unit_testing`, `Examples`) are excluded too.
pub fn is_main_target(name: &str) -> bool {
    let lower = name.to_lowercase();
    !NON_LIBRARY_MARKERS.iter().any(|m| lower.contains(m))
}

/// Keep only library targets, preserving order.
pub fn filter_main_targets(targets: &[String]) -> Vec<String> {
    targets.iter().filter(|t| is_main_target(t)).cloned().collect()
}

/// Clones repositories and inspects them.
#[derive(Debug, Clone, Default)]
pub struct RepositoryAnalyzer {
    keep_temp: bool,
}

impl RepositoryAnalyzer {
    pub fn new(keep_temp: bool) -> Self {
        RepositoryAnalyzer { keep_temp }
    }

    /// Clone `origin` and analyze it.
    ///
    /// An error means the clone failed. Failure to enumerate targets is not
    /// an error; it leaves `targets` unset.
    pub fn analyze(&self, origin: &str) -> Result<RepositoryAnalysis> {
        let scratch = ScratchDir::new("ce-lib-wizard-", self.keep_temp)?;
        let checkout = scratch.path().join("repo");
        shallow_clone(origin, &checkout)?;

        Ok(self.analyze_checkout(&checkout, &scratch.path().join("build")))
    }

    /// Analyze an existing checkout, configuring CMake into `build_dir`.
    pub fn analyze_checkout(&self, checkout: &Path, build_dir: &Path) -> RepositoryAnalysis {
        if !cmake::is_cmake_project(checkout) {
            tracing::debug!("no CMakeLists.txt in {}", checkout.display());
            return RepositoryAnalysis::default();
        }

        match cmake::list_targets(checkout, build_dir) {
            Ok(targets) => {
                let main_targets = filter_main_targets(&targets);
                tracing::debug!(
                    "found {} CMake targets, {} main: {}",
                    targets.len(),
                    main_targets.len(),
                    main_targets.join(", ")
                );
                RepositoryAnalysis {
                    has_manifest: true,
                    targets: Some(targets),
                    main_targets,
                }
            }
            Err(e) => {
                tracing::warn!("could not list CMake targets: {:#}", e);
                RepositoryAnalysis {
                    has_manifest: true,
                    targets: None,
                    main_targets: Vec::new(),
                }
            }
        }
    }

    /// Whether the repository at `origin` has `file` at its root.
    pub fn has_root_file(&self, origin: &str, file: &str) -> Result<bool> {
        let scratch = ScratchDir::new("ce-lib-wizard-", self.keep_temp)?;
        let checkout = scratch.path().join("repo");
        shallow_clone(origin, &checkout)?;
        Ok(checkout.join(file).is_file())
    }
}
