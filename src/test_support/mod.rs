//! Test utilities and mocks for unit tests.
//!
//! The mocks stand in for the network-facing traits in [`crate::sources`]:
//!
//! ```rust,ignore
//! use libwizard::test_support::MockTagProbe;
//!
//! let probe = MockTagProbe::new().with_tags("https://github.com/acme/widget", &["v1.0"]);
//! let resolved = VersionResolver::new(&probe).resolve("https://github.com/acme/widget", "1.0");
//! assert_eq!(resolved.prefix.as_deref(), Some("v"));
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};

use crate::sources::{ModuleProxy, TagProbe};

/// In-memory tag listing.
#[derive(Debug, Default)]
pub struct MockTagProbe {
    tags: HashMap<String, HashSet<String>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<(String, String)>>,
}

impl MockTagProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tags` exist for `origin`.
    pub fn with_tags(mut self, origin: &str, tags: &[&str]) -> Self {
        self.tags
            .entry(origin.to_string())
            .or_default()
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Make every lookup for `origin` fail.
    pub fn failing(mut self, origin: &str) -> Self {
        self.failing.insert(origin.to_string());
        self
    }

    /// Every `(origin, tag)` looked up, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl TagProbe for MockTagProbe {
    fn tag_exists(&self, origin: &str, tag: &str) -> Result<bool> {
        self.calls
            .borrow_mut()
            .push((origin.to_string(), tag.to_string()));

        if self.failing.contains(origin) {
            bail!("simulated timeout for {}", origin);
        }
        Ok(self.tags.get(origin).is_some_and(|t| t.contains(tag)))
    }
}

/// In-memory module proxy.
#[derive(Debug, Default)]
pub struct MockModuleProxy {
    modules: HashSet<(String, String)>,
    archives: HashMap<(String, String), Vec<u8>>,
    probed: RefCell<Vec<(String, String)>>,
}

impl MockModuleProxy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `module` at `version`.
    pub fn with_module(mut self, module: &str, version: &str) -> Self {
        self.modules.insert((module.to_string(), version.to_string()));
        self
    }

    /// Serve `bytes` as the archive of `module@version`.
    pub fn with_archive(mut self, module: &str, version: &str, bytes: Vec<u8>) -> Self {
        self.archives
            .insert((module.to_string(), version.to_string()), bytes);
        self
    }

    /// Every `(module, version)` existence probe, in order.
    pub fn probed(&self) -> Vec<(String, String)> {
        self.probed.borrow().clone()
    }
}

impl ModuleProxy for MockModuleProxy {
    fn module_exists(&self, module: &str, version: &str) -> Result<bool> {
        let key = (module.to_string(), version.to_string());
        self.probed.borrow_mut().push(key.clone());
        Ok(self.modules.contains(&key))
    }

    fn fetch_archive(&self, module: &str, version: &str) -> Result<Vec<u8>> {
        match self.archives.get(&(module.to_string(), version.to_string())) {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!("HTTP 404 for {}@{}", module, version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_tag_probe() {
        let probe = MockTagProbe::new()
            .with_tags("a", &["v1"])
            .failing("b");

        assert!(probe.tag_exists("a", "v1").unwrap());
        assert!(!probe.tag_exists("a", "1").unwrap());
        assert!(probe.tag_exists("b", "v1").is_err());
        assert_eq!(probe.calls().len(), 3);
    }

    #[test]
    fn test_mock_module_proxy() {
        let proxy = MockModuleProxy::new()
            .with_module("m", "v1")
            .with_archive("m", "v1", vec![1, 2]);

        assert!(proxy.module_exists("m", "v1").unwrap());
        assert!(!proxy.module_exists("m", "v2").unwrap());
        assert_eq!(proxy.fetch_archive("m", "v1").unwrap(), vec![1, 2]);
        assert!(proxy.fetch_archive("m", "v2").is_err());
        assert_eq!(proxy.probed().len(), 2);
    }
}
