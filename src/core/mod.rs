//! Core data structures.
//!
//! - Languages and library types
//! - Library requests and identifier conventions
//! - The installer's catalogue

pub mod catalogue;
pub mod identifier;
pub mod language;
pub mod library_type;
pub mod request;

pub use catalogue::{Catalogue, CatalogueEntry};
pub use language::Language;
pub use library_type::LibraryType;
pub use request::{LibraryRequest, Origin, RequestError};
