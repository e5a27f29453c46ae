//! Tag format reconciliation.
//!
//! Upstream projects tag either `1.2.3` or `v1.2.3`. The catalogue stores
//! the bare version plus one `target_prefix` for the whole library, so every
//! requested version must agree on the prefix.

use crate::resolver::errors::ResolveError;
use crate::sources::TagProbe;

/// Prefix conventionally put in front of version tags.
pub const V_PREFIX: &str = "v";

/// One version as it exists upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Version without prefix
    pub version: String,

    /// Prefix the tag carries, if any
    pub prefix: Option<String>,

    /// Whether the tag was found
    pub exists: bool,
}

/// All versions of one request, verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersions {
    /// Bare versions, in request order
    pub versions: Vec<String>,

    /// Prefix applied to every version of the library
    pub target_prefix: Option<String>,
}

/// Checks versions against upstream tags.
pub struct VersionResolver<'a> {
    probe: &'a dyn TagProbe,
}

impl<'a> VersionResolver<'a> {
    pub fn new(probe: &'a dyn TagProbe) -> Self {
        VersionResolver { probe }
    }

    /// Work out how `version` is tagged at `origin`.
    ///
    /// The `v` tag is preferred when both exist. When neither exists the
    /// user's own spelling decides the guessed prefix.
    pub fn resolve(&self, origin: &str, version: &str) -> ResolvedVersion {
        let version = version.trim();
        let supplied_prefix = version.starts_with(V_PREFIX);
        let bare = version.strip_prefix(V_PREFIX).unwrap_or(version).to_string();
        let prefixed = format!("{}{}", V_PREFIX, bare);

        if self.exists(origin, &prefixed) {
            return ResolvedVersion {
                version: bare,
                prefix: Some(V_PREFIX.to_string()),
                exists: true,
            };
        }

        if self.exists(origin, &bare) {
            if supplied_prefix {
                tracing::info!("tag {} not found, using {}", prefixed, bare);
            }
            return ResolvedVersion {
                version: bare,
                prefix: None,
                exists: true,
            };
        }

        ResolvedVersion {
            version: bare,
            prefix: supplied_prefix.then(|| V_PREFIX.to_string()),
            exists: false,
        }
    }

    /// Resolve every version in order and unify the prefix.
    ///
    /// Fails with every unverified version named if any is missing.
    pub fn resolve_all(
        &self,
        origin: &str,
        versions: &[String],
    ) -> Result<ResolvedVersions, ResolveError> {
        let results: Vec<ResolvedVersion> =
            versions.iter().map(|v| self.resolve(origin, v)).collect();
        Self::unify(origin, versions, &results)
    }

    /// Combine per-version results from [`resolve`](Self::resolve) without
    /// probing again. `results` pairs up with `requested` by position.
    pub fn unify(
        origin: &str,
        requested: &[String],
        results: &[ResolvedVersion],
    ) -> Result<ResolvedVersions, ResolveError> {
        let mut resolved = Vec::with_capacity(results.len());
        let mut missing = Vec::new();
        let mut target_prefix = None;

        for (requested, r) in requested.iter().zip(results) {
            tracing::debug!(
                "{} -> {} (prefix {:?}, exists {})",
                requested,
                r.version,
                r.prefix,
                r.exists
            );

            if !r.exists {
                missing.push(requested.clone());
                continue;
            }
            if r.prefix.is_some() {
                target_prefix = r.prefix.clone();
            }
            resolved.push(r.version.clone());
        }

        if !missing.is_empty() {
            return Err(ResolveError::MissingVersions {
                origin: origin.to_string(),
                versions: missing,
            });
        }

        Ok(ResolvedVersions {
            versions: resolved,
            target_prefix,
        })
    }

    fn exists(&self, origin: &str, tag: &str) -> bool {
        match self.probe.tag_exists(origin, tag) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("could not check tag {} of {}: {:#}", tag, origin, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTagProbe;

    const ORIGIN: &str = "https://github.com/acme/widget";

    fn resolve(tags: &[&str], version: &str) -> ResolvedVersion {
        let probe = MockTagProbe::new().with_tags(ORIGIN, tags);
        VersionResolver::new(&probe).resolve(ORIGIN, version)
    }

    fn rv(version: &str, prefix: Option<&str>, exists: bool) -> ResolvedVersion {
        ResolvedVersion {
            version: version.to_string(),
            prefix: prefix.map(str::to_string),
            exists,
        }
    }

    #[test]
    fn test_prefixed_input() {
        assert_eq!(resolve(&["v1.2.3", "1.2.3"], "v1.2.3"), rv("1.2.3", Some("v"), true));
        assert_eq!(resolve(&["v1.2.3"], "v1.2.3"), rv("1.2.3", Some("v"), true));
        assert_eq!(resolve(&["1.2.3"], "v1.2.3"), rv("1.2.3", None, true));
        assert_eq!(resolve(&[], "v1.2.3"), rv("1.2.3", Some("v"), false));
    }

    #[test]
    fn test_bare_input() {
        assert_eq!(resolve(&["v1.2.3"], "1.2.3"), rv("1.2.3", Some("v"), true));
        assert_eq!(resolve(&["v1.2.3", "1.2.3"], "1.2.3"), rv("1.2.3", Some("v"), true));
        assert_eq!(resolve(&["1.2.3"], "1.2.3"), rv("1.2.3", None, true));
        assert_eq!(resolve(&[], "1.2.3"), rv("1.2.3", None, false));
    }

    #[test]
    fn test_probe_errors_count_as_missing() {
        let probe = MockTagProbe::new().failing(ORIGIN);
        let r = VersionResolver::new(&probe).resolve(ORIGIN, "1.0");
        assert_eq!(r, rv("1.0", None, false));
    }

    #[test]
    fn test_prefix_is_unified_across_versions() {
        let probe = MockTagProbe::new().with_tags(ORIGIN, &["1.0", "v2.0"]);
        let resolved = VersionResolver::new(&probe)
            .resolve_all(ORIGIN, &["1.0".into(), "2.0".into()])
            .unwrap();

        assert_eq!(resolved.versions, vec!["1.0", "2.0"]);
        assert_eq!(resolved.target_prefix.as_deref(), Some("v"));
    }

    #[test]
    fn test_missing_versions_are_aggregated() {
        let probe = MockTagProbe::new().with_tags(ORIGIN, &["1.0"]);
        let err = VersionResolver::new(&probe)
            .resolve_all(ORIGIN, &["1.0".into(), "2.0".into()])
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::MissingVersions {
                origin: ORIGIN.to_string(),
                versions: vec!["2.0".to_string()],
            }
        );
    }

    #[test]
    fn test_unify_does_not_probe_again() {
        let probe = MockTagProbe::new().with_tags(ORIGIN, &["v1.0", "v2.0"]);
        let resolver = VersionResolver::new(&probe);
        let requested: Vec<String> = vec!["1.0".into(), "2.0".into()];

        let results: Vec<ResolvedVersion> =
            requested.iter().map(|v| resolver.resolve(ORIGIN, v)).collect();
        let probes = probe.calls().len();

        let resolved = VersionResolver::unify(ORIGIN, &requested, &results).unwrap();
        assert_eq!(resolved.versions, vec!["1.0", "2.0"]);
        assert_eq!(resolved.target_prefix.as_deref(), Some("v"));
        assert_eq!(probe.calls().len(), probes);
    }

    #[test]
    fn test_versions_checked_in_order() {
        let probe = MockTagProbe::new().with_tags(ORIGIN, &["v1.0", "v2.0"]);
        VersionResolver::new(&probe)
            .resolve_all(ORIGIN, &["2.0".into(), "1.0".into()])
            .unwrap();

        let calls = probe.calls();
        assert_eq!(calls[0].1, "v2.0");
        assert_eq!(calls[1].1, "v1.0");
    }
}
