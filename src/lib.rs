//! ce-lib-wizard - add third-party libraries to Compiler Explorer
//!
//! This crate provides the core library functionality for the wizard:
//! upstream version reconciliation, library type detection, Go module
//! resolution and the edits to the catalogue and properties files.

pub mod analysis;
pub mod core;
pub mod installer;
pub mod ops;
pub mod properties;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory tag probes, module proxies and
/// fixture builders for checkouts, git repositories and module archives.
#[cfg(test)]
pub mod test_support;

pub use core::{Catalogue, CatalogueEntry, Language, LibraryRequest, LibraryType, Origin};
pub use ops::{AddOptions, AddReport, Wizard, WizardError};
pub use resolver::{GoModuleResolver, VersionResolver};
pub use util::config::Config;
