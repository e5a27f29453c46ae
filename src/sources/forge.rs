//! GitHub REST lookups for releases and tags.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::util::config::NetConfig;

const USER_AGENT: &str = concat!("ce-lib-wizard/", env!("CARGO_PKG_VERSION"));

/// Extract `(owner, repo)` from a github.com URL.
pub fn parse_github_repo(origin: &str) -> Option<(String, String)> {
    let url = Url::parse(origin.trim()).ok()?;
    match url.host_str()? {
        "github.com" | "www.github.com" => {}
        _ => return None,
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Build the blocking HTTP client shared by forge and proxy lookups.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Release and tag lookups against the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    client: Client,
    base: String,
    token: Option<String>,
    timeout: Duration,
}

impl GitHubApi {
    pub fn new(client: Client, config: &NetConfig) -> Self {
        GitHubApi {
            client,
            base: config.github_api.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            timeout: config.probe_timeout(),
        }
    }

    /// Whether `owner/repo` has a release or a tag named `tag`.
    pub fn tag_exists(&self, owner: &str, repo: &str, tag: &str) -> Result<bool> {
        let release = format!("{}/repos/{}/{}/releases/tags/{}", self.base, owner, repo, tag);
        if self.probe(&release)? {
            tracing::debug!("release {} found for {}/{}", tag, owner, repo);
            return Ok(true);
        }

        let tag_ref = format!("{}/repos/{}/{}/git/ref/tags/{}", self.base, owner, repo, tag);
        let found = self.probe(&tag_ref)?;
        tracing::debug!(
            "tag {} {} for {}/{}",
            tag,
            if found { "found" } else { "not found" },
            owner,
            repo
        );
        Ok(found)
    }

    fn probe(&self, url: &str) -> Result<bool> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .timeout(self.timeout);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => bail!("GitHub API returned HTTP {} for {}", s, url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_repo() {
        assert_eq!(
            parse_github_repo("https://github.com/fmtlib/fmt"),
            Some(("fmtlib".into(), "fmt".into()))
        );
        assert_eq!(
            parse_github_repo("https://github.com/nlohmann/json.git/"),
            Some(("nlohmann".into(), "json".into()))
        );
        assert_eq!(
            parse_github_repo("https://github.com/google/uuid/tree/main"),
            Some(("google".into(), "uuid".into()))
        );
        assert_eq!(parse_github_repo("https://gitlab.com/a/b"), None);
        assert_eq!(parse_github_repo("https://github.com/lonely"), None);
        assert_eq!(parse_github_repo("not a url"), None);
    }

    #[test]
    fn test_api_base_is_trimmed() {
        let config = NetConfig {
            github_api: "https://ghe.example.com/api/v3/".to_string(),
            ..NetConfig::default()
        };
        let api = GitHubApi::new(Client::new(), &config);
        assert_eq!(api.base, "https://ghe.example.com/api/v3");
        assert_eq!(api.timeout, Duration::from_secs(10));
    }
}
