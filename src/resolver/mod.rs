//! Version, library type and Go module resolution.
//!
//! Resolvers are pure decision logic over the traits in [`crate::sources`];
//! all network access goes through those.

pub mod errors;
pub mod go;
pub mod library_type;
pub mod version;

pub use errors::ResolveError;
pub use go::{GoModuleResolver, ModuleResolution};
pub use library_type::{resolve_type, resolve_type_with_override, TypeDecision, TypeSource};
pub use version::{ResolvedVersion, ResolvedVersions, VersionResolver};
