//! Target ecosystems a library can be contributed for.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Ecosystem of a library request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cpp,
    Rust,
    Fortran,
    Go,
}

impl Language {
    /// All supported languages, in display order.
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Rust,
        Language::Fortran,
        Language::Go,
    ];

    /// Name used in file names and catalogue section keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "c++",
            Language::Rust => "rust",
            Language::Fortran => "fortran",
            Language::Go => "go",
        }
    }

    /// Key of this language's section under `libraries:` in the catalogue.
    ///
    /// C libraries are registered as `cshared` entries in the C++ section.
    pub fn catalogue_section(&self) -> &'static str {
        match self {
            Language::C | Language::Cpp => "c++",
            other => other.as_str(),
        }
    }

    /// Properties file for this language inside the main checkout.
    pub fn properties_path(&self, main_repo: &Path) -> PathBuf {
        main_repo
            .join("etc")
            .join("config")
            .join(format!("{}.amazon.properties", self.as_str()))
    }

    /// Whether libraries are identified by a bare package name rather than an origin.
    pub fn uses_package_name(&self) -> bool {
        matches!(self, Language::Rust)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Rust => "Rust",
            Language::Fortran => "Fortran",
            Language::Go => "Go",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cpp" | "cxx" => Ok(Language::Cpp),
            "rust" => Ok(Language::Rust),
            "fortran" => Ok(Language::Fortran),
            "go" | "golang" => Ok(Language::Go),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown language.
#[derive(Debug, Clone)]
pub struct LanguageParseError(pub String);

impl std::fmt::Display for LanguageParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid language '{}', valid values: c, c++, rust, fortran, go",
            self.0
        )
    }
}

impl std::error::Error for LanguageParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("C++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("golang".parse::<Language>().unwrap(), Language::Go);
        assert!("java".parse::<Language>().is_err());
    }

    #[test]
    fn test_properties_path() {
        let path = Language::Cpp.properties_path(Path::new("/work/compiler-explorer"));
        assert_eq!(
            path,
            PathBuf::from("/work/compiler-explorer/etc/config/c++.amazon.properties")
        );
    }

    #[test]
    fn test_c_shares_cpp_catalogue_section() {
        assert_eq!(Language::C.catalogue_section(), "c++");
        assert_eq!(Language::Fortran.catalogue_section(), "fortran");
    }
}
