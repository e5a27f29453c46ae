//! Command implementations

pub mod add;
pub mod completions;
pub mod detect_type;
pub mod go_module;
pub mod resolve_version;

use anyhow::Result;
use libwizard::sources::forge::http_client;
use libwizard::sources::{GitHubApi, GoProxyClient, RemoteTagProbe};
use libwizard::util::Config;

/// Tag probe that asks GitHub first and falls back to git.
pub fn tag_probe(config: &Config) -> Result<RemoteTagProbe> {
    let forge = GitHubApi::new(http_client()?, &config.net);
    Ok(RemoteTagProbe::new(Some(forge)))
}

/// Client for the configured Go module proxy.
pub fn module_proxy(config: &Config) -> Result<GoProxyClient> {
    Ok(GoProxyClient::new(http_client()?, &config.net))
}
