//! Go module root and import path resolution.

use std::collections::BTreeSet;
use std::io::Cursor;

use anyhow::{Context, Result};

use crate::core::identifier::normalize_go_version;
use crate::sources::ModuleProxy;

/// Top-level directories that never hold the package users want to import.
const SKIP_DIRS: &[&str] = &[
    "internal",
    "testdata",
    "vendor",
    "cmd",
    "example",
    "examples",
    "tools",
    "hack",
    "scripts",
    "doc",
    "docs",
    "bench",
    "benchmarks",
    "test",
    "testing",
    "testutil",
];

/// Paths with fewer segments than this are not walked up any further.
const MIN_WALK_SEGMENTS: usize = 3;

/// Result of [`GoModuleResolver::resolve_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolution {
    /// Path of the module to fetch
    pub module: String,

    /// Package to import instead of the module root
    pub import_override: Option<String>,
}

/// Resolves Go modules against a module proxy.
pub struct GoModuleResolver<'a> {
    proxy: &'a dyn ModuleProxy,
}

impl<'a> GoModuleResolver<'a> {
    pub fn new(proxy: &'a dyn ModuleProxy) -> Self {
        GoModuleResolver { proxy }
    }

    /// Whether `module` exists at `version`. Lookup errors count as absent.
    pub fn version_exists(&self, module: &str, version: &str) -> bool {
        let version = normalize_go_version(version);
        match self.proxy.module_exists(module, &version) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("could not check {}@{}: {:#}", module, version, e);
                false
            }
        }
    }

    /// Find the module that contains `path`.
    ///
    /// `google.golang.org/protobuf/proto` resolves to the module
    /// `google.golang.org/protobuf` with `.../proto` as the import override.
    /// If no ancestor is a module, `path` is returned unchanged.
    pub fn resolve_module(&self, path: &str, version: &str) -> ModuleResolution {
        self.find_module(path, version).unwrap_or_else(|| ModuleResolution {
            module: path.trim_end_matches('/').to_string(),
            import_override: None,
        })
    }

    /// Like [`resolve_module`](Self::resolve_module), but tries each of
    /// `versions` in turn until one locates a module.
    ///
    /// Returns `None` when no version finds `path` or any ancestor.
    pub fn resolve_module_any(&self, path: &str, versions: &[String]) -> Option<ModuleResolution> {
        versions.iter().find_map(|version| self.find_module(path, version))
    }

    fn find_module(&self, path: &str, version: &str) -> Option<ModuleResolution> {
        let path = path.trim_end_matches('/');

        if self.version_exists(path, version) {
            return Some(ModuleResolution {
                module: path.to_string(),
                import_override: None,
            });
        }

        let mut segments: Vec<&str> = path.split('/').collect();
        while segments.len() >= MIN_WALK_SEGMENTS {
            segments.pop();
            let candidate = segments.join("/");
            if self.version_exists(&candidate, version) {
                tracing::info!(
                    "resolved module: {} -> module={}, import_path={}",
                    path,
                    candidate,
                    path
                );
                return Some(ModuleResolution {
                    module: candidate,
                    import_override: Some(path.to_string()),
                });
            }
        }

        None
    }

    /// Work out whether the module root is importable, and if not which
    /// sub-package to import instead.
    ///
    /// Any download or archive problem yields `None`.
    pub fn detect_import_path(&self, module: &str, version: &str) -> Option<String> {
        let version = normalize_go_version(version);

        let archive = match self.proxy.fetch_archive(module, &version) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("could not download module archive: {:#}", e);
                return None;
            }
        };

        match inspect_module_archive(&archive, module, &version) {
            Ok(import_path) => import_path,
            Err(e) => {
                tracing::warn!("invalid module archive for {}@{}: {:#}", module, version, e);
                None
            }
        }
    }
}

/// Inspect a module zip for an importable root package.
pub fn inspect_module_archive(bytes: &[u8], module: &str, version: &str) -> Result<Option<String>> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).context("not a zip archive")?;
    let prefix = format!("{}@{}/", module, version);

    let mut root_has_go = false;
    let mut subpackages = BTreeSet::new();

    for name in archive.file_names() {
        let Some(rel) = name.strip_prefix(&prefix) else {
            continue;
        };
        if !is_library_source(rel) {
            continue;
        }

        match rel.split_once('/') {
            None => root_has_go = true,
            Some((dir, _)) => {
                if !SKIP_DIRS.contains(&dir) {
                    subpackages.insert(dir.to_string());
                }
            }
        }
    }

    if root_has_go {
        tracing::info!("root package of {} is importable", module);
        return Ok(None);
    }

    let Some(best) = pick_best_subpackage(module, &subpackages) else {
        tracing::warn!("no importable packages found in {}", module);
        return Ok(None);
    };

    let import_path = format!("{}/{}", module, best);
    tracing::info!(
        "root of {} is not importable, using {} ({} candidates)",
        module,
        import_path,
        subpackages.len()
    );
    Ok(Some(import_path))
}

fn is_library_source(rel: &str) -> bool {
    rel.ends_with(".go") && !rel.ends_with("_test.go")
}

/// Choose the sub-package most likely to be the module's main package.
///
/// A name that is a prefix of the module's last segment (or the other way
/// round) wins, otherwise the shortest name. Ties go alphabetically.
pub fn pick_best_subpackage<'s>(module: &str, candidates: &'s BTreeSet<String>) -> Option<&'s str> {
    let module_name = module
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let related = candidates.iter().find(|sub| {
        let sub = sub.to_lowercase();
        module_name.starts_with(&sub) || sub.starts_with(&module_name)
    });

    related
        .or_else(|| candidates.iter().min_by_key(|s| s.len()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::go_module_zip;
    use crate::test_support::MockModuleProxy;

    const PROTOBUF: &str = "google.golang.org/protobuf";

    #[test]
    fn test_resolve_module_walks_up() {
        let proxy = MockModuleProxy::new().with_module(PROTOBUF, "v1.36.0");
        let resolution =
            GoModuleResolver::new(&proxy).resolve_module("google.golang.org/protobuf/proto", "v1.36.0");

        assert_eq!(
            resolution,
            ModuleResolution {
                module: PROTOBUF.to_string(),
                import_override: Some("google.golang.org/protobuf/proto".to_string()),
            }
        );
    }

    #[test]
    fn test_resolve_module_root_is_unchanged() {
        let proxy = MockModuleProxy::new().with_module("github.com/google/uuid", "v1.6.0");
        let resolution = GoModuleResolver::new(&proxy).resolve_module("github.com/google/uuid", "1.6.0");
        assert_eq!(resolution.module, "github.com/google/uuid");
        assert_eq!(resolution.import_override, None);
    }

    #[test]
    fn test_resolve_module_stops_below_three_segments() {
        let proxy = MockModuleProxy::new().with_module("github.com", "v1.0.0");
        let resolution =
            GoModuleResolver::new(&proxy).resolve_module("github.com/acme/widget/sub", "v1.0.0");

        assert_eq!(resolution.module, "github.com/acme/widget/sub");
        assert_eq!(resolution.import_override, None);
        assert!(!proxy
            .probed()
            .iter()
            .any(|(module, _)| module == "github.com"));
    }

    #[test]
    fn test_resolve_module_any_skips_missing_version() {
        let proxy = MockModuleProxy::new().with_module(PROTOBUF, "v1.36.0");
        let versions = vec!["v9.9.9".to_string(), "v1.36.0".to_string()];
        let resolution = GoModuleResolver::new(&proxy)
            .resolve_module_any("google.golang.org/protobuf/proto", &versions)
            .unwrap();

        assert_eq!(resolution.module, PROTOBUF);
        assert_eq!(
            resolution.import_override.as_deref(),
            Some("google.golang.org/protobuf/proto")
        );
    }

    #[test]
    fn test_resolve_module_any_none_found() {
        let proxy = MockModuleProxy::new();
        let versions = vec!["v1.0.0".to_string()];
        assert!(GoModuleResolver::new(&proxy)
            .resolve_module_any("github.com/acme/nothing", &versions)
            .is_none());
    }

    #[test]
    fn test_root_package_importable() {
        let zip = go_module_zip(
            "github.com/google/uuid",
            "v1.6.0",
            &["uuid.go", "uuid_test.go", "internal/x.go"],
        );
        assert_eq!(inspect_module_archive(&zip, "github.com/google/uuid", "v1.6.0").unwrap(), None);
    }

    #[test]
    fn test_sub_package_prefix_match() {
        let zip = go_module_zip(
            PROTOBUF,
            "v1.36.0",
            &[
                "go.mod",
                "encoding/json.go",
                "proto/proto.go",
                "proto/proto_test.go",
                "cmd/protoc-gen-go/main.go",
                "internal/impl/impl.go",
                "types/known.go",
            ],
        );
        assert_eq!(
            inspect_module_archive(&zip, PROTOBUF, "v1.36.0").unwrap(),
            Some("google.golang.org/protobuf/proto".to_string())
        );
    }

    #[test]
    fn test_sub_package_shortest_name() {
        let zip = go_module_zip(
            "github.com/acme/toolkit",
            "v0.1.0",
            &["zeta/z.go", "core/c.go", "alpha/a.go", "tests/t.go"],
        );
        // `core` and `zeta` tie on length
        assert_eq!(
            inspect_module_archive(&zip, "github.com/acme/toolkit", "v0.1.0").unwrap(),
            Some("github.com/acme/toolkit/core".to_string())
        );
    }

    #[test]
    fn test_only_tests_in_tree() {
        let zip = go_module_zip("github.com/acme/x", "v1.0.0", &["x_test.go", "internal/y.go"]);
        assert_eq!(inspect_module_archive(&zip, "github.com/acme/x", "v1.0.0").unwrap(), None);
    }

    #[test]
    fn test_detect_import_path_degrades() {
        let proxy = MockModuleProxy::new();
        let resolver = GoModuleResolver::new(&proxy);
        assert_eq!(resolver.detect_import_path(PROTOBUF, "v1.36.0"), None);

        let proxy = MockModuleProxy::new().with_archive(PROTOBUF, "v1.36.0", b"not a zip".to_vec());
        let resolver = GoModuleResolver::new(&proxy);
        assert_eq!(resolver.detect_import_path(PROTOBUF, "v1.36.0"), None);
    }

    #[test]
    fn test_pick_best_subpackage_either_direction() {
        let subs: BTreeSet<String> = ["protobuf", "zz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(pick_best_subpackage("example.com/x/proto", &subs), Some("protobuf"));
        assert_eq!(pick_best_subpackage("example.com/x/y", &BTreeSet::new()), None);
    }
}
