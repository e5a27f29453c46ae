//! Upstream information sources.
//!
//! Everything that talks to the network lives here: forge release/tag
//! lookups, git remotes and the Go module proxy. Resolvers only see the
//! traits below so they can be exercised against in-memory fakes.

pub mod forge;
pub mod git;
pub mod proxy;

use anyhow::Result;

pub use forge::GitHubApi;
pub use git::RemoteTagProbe;
pub use proxy::GoProxyClient;

/// Answers "does this tag exist upstream?".
pub trait TagProbe {
    /// Whether `tag` exists for the repository at `origin`.
    ///
    /// Errors mean the question could not be answered, not that the tag is absent.
    fn tag_exists(&self, origin: &str, tag: &str) -> Result<bool>;
}

/// Read access to a Go module proxy.
pub trait ModuleProxy {
    /// Whether `module` is a module with a published `version`.
    fn module_exists(&self, module: &str, version: &str) -> Result<bool>;

    /// Download the source archive for `module` at `version`.
    fn fetch_archive(&self, module: &str, version: &str) -> Result<Vec<u8>>;
}
