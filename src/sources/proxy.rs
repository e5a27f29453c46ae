//! Go module proxy client.
//!
//! Speaks the `GOPROXY` protocol: `{proxy}/{module}/@v/{version}.info` to
//! check that a version exists and `.zip` for the source archive.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::sources::ModuleProxy;
use crate::util::config::NetConfig;

/// Escape a module path or version for use in proxy URLs.
///
/// Upper-case letters become `!` followed by the lower-case letter.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// HTTP client for a module proxy.
#[derive(Debug, Clone)]
pub struct GoProxyClient {
    client: Client,
    base: String,
    probe_timeout: Duration,
    download_timeout: Duration,
}

impl GoProxyClient {
    pub fn new(client: Client, config: &NetConfig) -> Self {
        GoProxyClient {
            client,
            base: config.go_proxy.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout(),
            download_timeout: config.download_timeout(),
        }
    }

    fn endpoint(&self, module: &str, version: &str, ext: &str) -> String {
        format!(
            "{}/{}/@v/{}.{}",
            self.base,
            escape_module_path(module),
            escape_module_path(version),
            ext
        )
    }
}

impl ModuleProxy for GoProxyClient {
    fn module_exists(&self, module: &str, version: &str) -> Result<bool> {
        let url = self.endpoint(module, version, "info");
        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            // the proxy answers 410 for paths that are not modules
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
            s => bail!("module proxy returned HTTP {} for {}", s, url),
        }
    }

    fn fetch_archive(&self, module: &str, version: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(module, version, "zip");
        tracing::info!("Downloading {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.download_timeout)
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }

        let bytes = response
            .bytes()
            .with_context(|| "failed to read module archive")?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_module_path() {
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
        assert_eq!(escape_module_path("github.com/google/uuid"), "github.com/google/uuid");
    }

    #[test]
    fn test_endpoint() {
        let config = NetConfig {
            go_proxy: "https://goproxy.example/".to_string(),
            ..NetConfig::default()
        };
        let proxy = GoProxyClient::new(Client::new(), &config);
        assert_eq!(
            proxy.endpoint("github.com/Masterminds/semver", "v3.2.1", "info"),
            "https://goproxy.example/github.com/!masterminds/semver/@v/v3.2.1.info"
        );
    }
}
