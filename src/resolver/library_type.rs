//! Library type selection.

use std::fmt;

use crate::analysis::RepositoryAnalysis;
use crate::core::{CatalogueEntry, Language, LibraryType};

/// What decided the library type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    Override,
    NoBuildStep,
    RecordedTag,
    ForgeDefault,
    Detected,
}

impl fmt::Display for TypeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeSource::Override => "given on the command line",
            TypeSource::NoBuildStep => "catalogue entry has build_type: none",
            TypeSource::RecordedTag => "recorded in the catalogue",
            TypeSource::ForgeDefault => "catalogue entry has no build type",
            TypeSource::Detected => "detected from the repository",
        };
        f.write_str(s)
    }
}

/// A chosen library type and its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDecision {
    pub library_type: LibraryType,
    pub source: TypeSource,
}

/// Pick the library type, preferring what the catalogue already records.
pub fn resolve_type(
    analysis: &RepositoryAnalysis,
    existing: Option<&CatalogueEntry>,
    language: Language,
) -> TypeDecision {
    if let Some(entry) = existing {
        if entry.build_type.as_deref() == Some("none") {
            return decision(LibraryType::HeaderOnly, TypeSource::NoBuildStep);
        }

        let recorded = [entry.lib_type.as_deref(), entry.kind.as_deref()]
            .into_iter()
            .flatten()
            .find_map(LibraryType::from_tag);
        if let Some(ty) = recorded {
            return decision(ty, TypeSource::RecordedTag);
        }

        if entry.kind.as_deref() == Some("github") && entry.build_type.is_none() {
            return decision(LibraryType::HeaderOnly, TypeSource::ForgeDefault);
        }
    }

    let detected = match (analysis.has_manifest, language) {
        (true, Language::C) => LibraryType::Shared,
        (true, _) => LibraryType::PackagedHeaders,
        (false, _) => LibraryType::HeaderOnly,
    };
    decision(detected, TypeSource::Detected)
}

/// Like [`resolve_type`], but an explicit choice wins.
pub fn resolve_type_with_override(
    requested: Option<LibraryType>,
    analysis: &RepositoryAnalysis,
    existing: Option<&CatalogueEntry>,
    language: Language,
) -> TypeDecision {
    match requested {
        Some(ty) => decision(ty, TypeSource::Override),
        None => resolve_type(analysis, existing, language),
    }
}

fn decision(library_type: LibraryType, source: TypeSource) -> TypeDecision {
    TypeDecision {
        library_type,
        source,
    }
}
