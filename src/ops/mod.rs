//! High-level operations.
//!
//! This module contains the implementation of the `add` command's
//! per-language flows and the checks that run after them.

pub mod add_library;
pub mod consistency;
pub mod errors;

pub use add_library::{cpp_properties_files, AddOptions, AddReport, Wizard};
pub use consistency::{check_library_paths, properties_reference, run_install_test, PathCheck};
pub use errors::WizardError;
