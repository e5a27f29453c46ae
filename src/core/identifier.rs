//! Library identifier and version-key conventions.

use std::sync::LazyLock;

use regex::Regex;

static GITHUB_REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/[^/]+/([^/?#]+)").expect("valid regex"));

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

static LIBRARY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"));

/// Fallback when no identifier can be derived.
pub const UNKNOWN_LIBRARY: &str = "unknown_library";

/// Suggest a library identifier from a GitHub URL.
///
/// `https://github.com/nlohmann/JSON-for-Modern-CPP.git` becomes
/// `json_for_modern_cpp`.
pub fn suggest_library_id_from_url(url: &str) -> String {
    let Some(caps) = GITHUB_REPO_RE.captures(url) else {
        return UNKNOWN_LIBRARY.to_string();
    };

    let repo = &caps[1];
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    clean_identifier(repo)
}

/// Suggest a library identifier from a Go module path (its last segment).
pub fn suggest_library_id_from_module(module: &str) -> String {
    let last = module
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    clean_identifier(last)
}

fn clean_identifier(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let id = NON_ALNUM_RE.replace_all(&lowered, "_");
    let id = id.trim_matches('_');

    if id.is_empty() {
        return UNKNOWN_LIBRARY.to_string();
    }

    if id.starts_with(|c: char| c.is_ascii_alphabetic()) {
        id.to_string()
    } else {
        format!("lib_{}", id)
    }
}

/// Whether an identifier follows the `lowercase_with_underscores` convention.
pub fn validate_library_id(id: &str) -> bool {
    LIBRARY_ID_RE.is_match(id)
}

/// Properties key for a version: lowercase with everything but `[a-z0-9]` dropped.
///
/// `v1.36.0` becomes `v1360`.
pub fn version_key(version: &str) -> String {
    version
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Go versions always carry a leading `v`.
pub fn normalize_go_version(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Derive the GitHub repository URL from a Go module path, when it is hosted there.
pub fn module_to_github_url(module: &str) -> Option<String> {
    let rest = module.strip_prefix("github.com/")?;
    let mut parts = rest.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("https://github.com/{}/{}", owner, repo))
}

/// Display name for a Go module: its last two path segments.
pub fn module_display_name(module: &str) -> String {
    let parts: Vec<&str> = module.trim_end_matches('/').split('/').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2..].join("/")
    } else {
        parts.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_from_url() {
        assert_eq!(
            suggest_library_id_from_url("https://github.com/fmtlib/fmt"),
            "fmt"
        );
        assert_eq!(
            suggest_library_id_from_url("https://github.com/nlohmann/JSON-for-Modern-CPP.git"),
            "json_for_modern_cpp"
        );
        assert_eq!(
            suggest_library_id_from_url("https://github.com/acme/3dmath"),
            "lib_3dmath"
        );
        assert_eq!(
            suggest_library_id_from_url("https://gitlab.com/acme/widget"),
            UNKNOWN_LIBRARY
        );
    }

    #[test]
    fn test_suggest_from_module() {
        assert_eq!(suggest_library_id_from_module("github.com/google/uuid"), "uuid");
        assert_eq!(
            suggest_library_id_from_module("google.golang.org/protobuf"),
            "protobuf"
        );
        assert_eq!(
            suggest_library_id_from_module("github.com/go-chi/chi-router/"),
            "chi_router"
        );
    }

    #[test]
    fn test_validate_library_id() {
        assert!(validate_library_id("abseil"));
        assert!(validate_library_id("nlohmann_json2"));
        assert!(!validate_library_id("Abseil"));
        assert!(!validate_library_id("2fast"));
        assert!(!validate_library_id("json-cpp"));
    }

    #[test]
    fn test_version_key() {
        assert_eq!(version_key("v1.36.0"), "v1360");
        assert_eq!(version_key("1.2.3-RC1"), "123rc1");
        assert_eq!(version_key("trunk"), "trunk");
    }

    #[test]
    fn test_module_helpers() {
        assert_eq!(
            module_to_github_url("github.com/google/uuid"),
            Some("https://github.com/google/uuid".to_string())
        );
        assert_eq!(
            module_to_github_url("github.com/hashicorp/consul/api"),
            Some("https://github.com/hashicorp/consul".to_string())
        );
        assert_eq!(module_to_github_url("google.golang.org/protobuf"), None);

        assert_eq!(module_display_name("github.com/pkg/errors"), "pkg/errors");
        assert_eq!(normalize_go_version("1.6.0"), "v1.6.0");
        assert_eq!(normalize_go_version("v1.6.0"), "v1.6.0");
    }
}
