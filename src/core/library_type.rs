//! Packaging variant of a library.

use serde::{Deserialize, Serialize};

/// How the installer fetches, builds and exposes a library.
///
/// Assigned once per library, not per version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibraryType {
    HeaderOnly,
    PackagedHeaders,
    Static,
    Shared,
    #[serde(rename = "cshared")]
    CShared,
}

impl LibraryType {
    /// Tag used by the installer's `--type` flag and the catalogue.
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::HeaderOnly => "header-only",
            LibraryType::PackagedHeaders => "packaged-headers",
            LibraryType::Static => "static",
            LibraryType::Shared => "shared",
            LibraryType::CShared => "cshared",
        }
    }

    /// Map a recorded catalogue tag onto the variant set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "header-only" | "headeronly" => Some(LibraryType::HeaderOnly),
            "packaged-headers" => Some(LibraryType::PackagedHeaders),
            "static" => Some(LibraryType::Static),
            "shared" => Some(LibraryType::Shared),
            "cshared" | "c-shared" => Some(LibraryType::CShared),
            _ => None,
        }
    }

    /// Whether the library produces link artifacts the installer must know about.
    pub fn needs_link_targets(&self) -> bool {
        matches!(
            self,
            LibraryType::Static | LibraryType::Shared | LibraryType::CShared
        )
    }
}

impl std::fmt::Display for LibraryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LibraryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LibraryType::from_tag(&s.to_lowercase()).ok_or_else(|| {
            format!(
                "invalid library type '{}', valid values: header-only, packaged-headers, static, shared, cshared",
                s
            )
        })
    }
}
