//! Configuration file support.
//!
//! Settings are read from `<config dir>/ce-lib-wizard/config.toml` when it
//! exists, then overridden by environment variables (`GITHUB_TOKEN`,
//! `GOPROXY`) and finally by command-line flags.
//!
//! ```toml
//! [net]
//! probe_timeout_secs = 10
//! download_timeout_secs = 30
//! github_api = "https://api.github.com"
//! go_proxy = "https://proxy.golang.org"
//!
//! [install]
//! executable = "bin/ce_install"
//! keep_temp = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default GitHub REST API endpoint.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Default Go module proxy.
pub const DEFAULT_GO_PROXY: &str = "https://proxy.golang.org";

/// Wizard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub net: NetConfig,

    /// Installer settings
    pub install: InstallConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Timeout for tag, release and module existence probes
    pub probe_timeout_secs: u64,

    /// Timeout for module archive downloads
    pub download_timeout_secs: u64,

    /// GitHub REST API base URL
    pub github_api: String,

    /// Go module proxy base URL
    pub go_proxy: String,

    /// Token sent to the GitHub API (raises the rate limit)
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            probe_timeout_secs: 10,
            download_timeout_secs: 30,
            github_api: DEFAULT_GITHUB_API.to_string(),
            go_proxy: DEFAULT_GO_PROXY.to_string(),
            github_token: None,
        }
    }
}

impl NetConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Installer-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Installer executable, relative to the infra checkout
    pub executable: PathBuf,

    /// Run `make ce` in the infra checkout before using the installer
    pub run_setup: bool,

    /// Keep temporary clones for debugging
    pub keep_temp: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            executable: PathBuf::from("bin/ce_install"),
            run_setup: true,
            keep_temp: false,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Load the user config file and apply environment overrides.
    pub fn from_environment() -> Self {
        let mut config = match default_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.net.github_token = Some(token.trim().to_string());
        }

        // GOPROXY is a comma/pipe separated list; only a plain URL entry is usable
        if let Some(proxy) = lookup("GOPROXY") {
            let first = proxy
                .split([',', '|'])
                .map(str::trim)
                .find(|p| p.starts_with("http://") || p.starts_with("https://"));
            if let Some(first) = first {
                self.net.go_proxy = first.trim_end_matches('/').to_string();
            }
        }
    }
}

/// Location of the user config file.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "compiler-explorer", "ce-lib-wizard")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
