//! Git remotes: tag listing and shallow clones.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use git2::{Direction, FetchOptions, Remote, Repository};

use crate::sources::forge::{parse_github_repo, GitHubApi};
use crate::sources::TagProbe;
use crate::util::config::NetConfig;

/// Bound libgit2's connect and server read timeouts.
///
/// The settings are process-wide: connecting uses the probe timeout and
/// waiting on the server uses the download timeout.
pub fn set_network_timeouts(net: &NetConfig) -> Result<()> {
    let connect = millis(net.probe_timeout());
    let server = millis(net.download_timeout());

    // SAFETY: called before any git network operation starts.
    unsafe {
        git2::opts::set_server_connect_timeout_in_milliseconds(connect)
            .context("failed to set git connect timeout")?;
        git2::opts::set_server_timeout_in_milliseconds(server)
            .context("failed to set git server timeout")?;
    }

    tracing::debug!("git timeouts: connect {}ms, server {}ms", connect, server);
    Ok(())
}

fn millis(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}

/// Whether the remote advertises `refs/tags/<tag>`, like `git ls-remote`.
pub fn remote_has_tag(url: &str, tag: &str) -> Result<bool> {
    let wanted = format!("refs/tags/{}", tag);

    let mut remote = Remote::create_detached(url)
        .with_context(|| format!("invalid git remote {}", url))?;
    remote
        .connect(Direction::Fetch)
        .with_context(|| format!("failed to connect to {}", url))?;

    let found = remote
        .list()
        .with_context(|| format!("failed to list refs of {}", url))?
        .iter()
        .any(|head| head.name() == wanted);

    remote.disconnect().ok();
    Ok(found)
}

/// Clone `url` into `dest` with only the latest commit.
///
/// Local paths are cloned in full, libgit2 cannot shallow-fetch them.
pub fn shallow_clone(url: &str, dest: &Path) -> Result<Repository> {
    tracing::info!("Cloning {}", url);

    let mut fetch = FetchOptions::new();
    if !is_local(url) {
        fetch.depth(1);
    }

    RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, dest)
        .with_context(|| format!("failed to clone {}", url))
}

fn is_local(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).exists()
}

/// Tag probe that asks the forge API first and falls back to the git remote.
#[derive(Debug, Clone, Default)]
pub struct RemoteTagProbe {
    forge: Option<GitHubApi>,
}

impl RemoteTagProbe {
    pub fn new(forge: Option<GitHubApi>) -> Self {
        RemoteTagProbe { forge }
    }
}

impl TagProbe for RemoteTagProbe {
    fn tag_exists(&self, origin: &str, tag: &str) -> Result<bool> {
        if let (Some(api), Some((owner, repo))) = (&self.forge, parse_github_repo(origin)) {
            match api.tag_exists(&owner, &repo, tag) {
                Ok(found) => return Ok(found),
                Err(e) => {
                    tracing::debug!("forge lookup failed, falling back to git: {:#}", e);
                }
            }
        }

        remote_has_tag(origin, tag)
    }
}
