//! A user's intent to add a library.

use thiserror::Error;

use crate::core::identifier::{
    normalize_go_version, suggest_library_id_from_module, suggest_library_id_from_url,
    validate_library_id,
};
use crate::core::{Language, LibraryType};

/// Where a library comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Source-control URL (C, C++, Fortran)
    Url(String),
    /// Go module path, e.g. `github.com/google/uuid`
    Module(String),
    /// Bare registry package name (Rust crates)
    Package(String),
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Url(s) | Origin::Module(s) | Origin::Package(s) => s,
        }
    }
}

/// Invalid combination of request fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("{language} libraries need a {expected}")]
    MissingOrigin {
        language: Language,
        expected: &'static str,
    },

    #[error("{language} libraries take a {expected}, not {given}")]
    WrongOrigin {
        language: Language,
        expected: &'static str,
        given: &'static str,
    },

    #[error("no versions given")]
    NoVersions,

    #[error("invalid library id `{0}`: use lowercase letters, digits and underscores, starting with a letter")]
    InvalidLibraryId(String),
}

/// Request to add one library in one or more versions.
///
/// Built once from user input and normalized on construction: versions are
/// split and trimmed (and `v`-prefixed for Go), and C libraries are always
/// `cshared`.
#[derive(Debug, Clone)]
pub struct LibraryRequest {
    language: Language,
    origin: Origin,
    versions: Vec<String>,
    library_id: Option<String>,
    library_type: Option<LibraryType>,
}

impl LibraryRequest {
    /// Create a request. Exactly one of `origin`/`package` must be set, as the language dictates.
    pub fn new(
        language: Language,
        origin: Option<&str>,
        package: Option<&str>,
        versions: &str,
    ) -> Result<Self, RequestError> {
        let origin = match (language, origin, package) {
            (Language::Rust, None, Some(name)) => Origin::Package(name.trim().to_string()),
            (Language::Rust, Some(_), _) => {
                return Err(RequestError::WrongOrigin {
                    language,
                    expected: "crate name",
                    given: "a source URL",
                })
            }
            (Language::Rust, None, None) => {
                return Err(RequestError::MissingOrigin {
                    language,
                    expected: "crate name",
                })
            }
            (_, _, Some(_)) => {
                return Err(RequestError::WrongOrigin {
                    language,
                    expected: expected_origin(language),
                    given: "a package name",
                })
            }
            (Language::Go, Some(module), None) => Origin::Module(normalize_module_path(module)),
            (_, Some(url), None) => Origin::Url(url.trim().trim_end_matches('/').to_string()),
            (_, None, None) => {
                return Err(RequestError::MissingOrigin {
                    language,
                    expected: expected_origin(language),
                })
            }
        };

        let mut versions = split_versions(versions);
        if versions.is_empty() {
            return Err(RequestError::NoVersions);
        }
        if language == Language::Go {
            versions = versions.iter().map(|v| normalize_go_version(v)).collect();
        }

        Ok(LibraryRequest {
            language,
            origin,
            versions,
            library_id: None,
            library_type: (language == Language::C).then_some(LibraryType::CShared),
        })
    }

    /// Use a pre-chosen library identifier.
    pub fn with_library_id(mut self, id: impl Into<String>) -> Result<Self, RequestError> {
        let id = id.into();
        if !validate_library_id(&id) {
            return Err(RequestError::InvalidLibraryId(id));
        }
        self.library_id = Some(id);
        Ok(self)
    }

    /// Override library type detection. Ignored for C, which is always `cshared`.
    pub fn with_library_type(mut self, ty: LibraryType) -> Self {
        if self.language != Language::C {
            self.library_type = Some(ty);
        }
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn library_id(&self) -> Option<&str> {
        self.library_id.as_deref()
    }

    pub fn library_type(&self) -> Option<LibraryType> {
        self.library_type
    }

    /// The explicit identifier, or one derived from the origin.
    pub fn suggested_id(&self) -> String {
        if let Some(ref id) = self.library_id {
            return id.clone();
        }
        match &self.origin {
            Origin::Url(url) => suggest_library_id_from_url(url),
            Origin::Module(module) => suggest_library_id_from_module(module),
            Origin::Package(name) => name.clone(),
        }
    }
}

fn expected_origin(language: Language) -> &'static str {
    match language {
        Language::Go => "module path",
        _ => "source URL",
    }
}

/// Accept `https://github.com/google/uuid` as the module `github.com/google/uuid`.
fn normalize_module_path(module: &str) -> String {
    let module = module.trim();
    let module = module
        .strip_prefix("https://")
        .or_else(|| module.strip_prefix("http://"))
        .unwrap_or(module);
    let module = module.trim_end_matches('/');
    module.strip_suffix(".git").unwrap_or(module).to_string()
}

/// Split comma-separated version input, preserving order.
pub fn split_versions(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
