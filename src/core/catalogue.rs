//! The installer's library catalogue (`bin/yaml/libraries.yaml`).
//!
//! Lookups are read-only. The only writer here is the Go path, which the
//! installer does not manage.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::util::fs;

/// Catalogue location inside the infra checkout.
pub fn libraries_yaml_path(infra: &Path) -> PathBuf {
    infra.join("bin").join("yaml").join("libraries.yaml")
}

/// One library as recorded in the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogueEntry {
    /// Key of the entry inside its section
    #[serde(skip)]
    pub identifier: String,

    /// Section the entry was found in
    #[serde(skip)]
    pub section: String,

    pub url: Option<String>,

    /// Short `owner/name` form of the origin
    pub repo: Option<String>,

    /// Legacy type tag (`github`, `header-only`, `gomod`, ...)
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub lib_type: Option<String>,

    pub build_type: Option<String>,

    /// Plain version strings or mappings with a `name` key
    pub targets: Vec<Value>,

    pub staticliblink: Vec<String>,

    pub sharedliblink: Vec<String>,

    pub module: Option<String>,

    pub import_path: Option<String>,
}

impl CatalogueEntry {
    /// Version names listed under `targets`.
    pub fn target_names(&self) -> Vec<String> {
        self.targets
            .iter()
            .filter_map(|t| match t {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Mapping(m) => m
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

/// Parsed catalogue, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
    skipped: Vec<String>,
}

impl Catalogue {
    /// Load the catalogue from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load the catalogue of an infra checkout, or an empty one if it has none.
    pub fn load_from_infra(infra: &Path) -> Result<Self> {
        let path = libraries_yaml_path(infra);
        if !path.exists() {
            tracing::debug!("no catalogue at {}", path.display());
            return Ok(Catalogue::default());
        }
        Self::load(&path)
    }

    /// Parse catalogue YAML. Entries that do not fit the record shape are skipped.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content)?;
        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        let Some(sections) = root.get("libraries").and_then(Value::as_mapping) else {
            return Ok(Catalogue { entries, skipped });
        };

        for (section, libraries) in sections {
            let (Some(section), Some(libraries)) = (section.as_str(), libraries.as_mapping())
            else {
                continue;
            };

            for (id, fields) in libraries {
                let Some(id) = id.as_str() else { continue };
                if !fields.is_mapping() {
                    tracing::warn!("skipping catalogue entry {}/{}: not a mapping", section, id);
                    skipped.push(format!("{}/{}", section, id));
                    continue;
                }

                match serde_yaml::from_value::<CatalogueEntry>(fields.clone()) {
                    Ok(mut entry) => {
                        entry.identifier = id.to_string();
                        entry.section = section.to_string();
                        entries.push(entry);
                    }
                    Err(e) => {
                        tracing::warn!("skipping catalogue entry {}/{}: {}", section, id, e);
                        skipped.push(format!("{}/{}", section, id));
                    }
                }
            }
        }

        Ok(Catalogue { entries, skipped })
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `<section>/<id>` of every entry that could not be read.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Find an existing entry for a library.
    ///
    /// Matches, in order: the identifier as a key in any section; an entry
    /// whose `url` equals the origin; an entry whose `repo` the origin ends
    /// with. Trailing `/` and `.git` are ignored on both sides.
    pub fn find_entry(&self, origin: &str, identifier: Option<&str>) -> Option<&CatalogueEntry> {
        if let Some(id) = identifier {
            if let Some(entry) = self.entries.iter().find(|e| e.identifier == id) {
                return Some(entry);
            }
        }

        let origin = normalize_origin(origin);
        if origin.is_empty() {
            return None;
        }

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.url.as_deref().map(normalize_origin) == Some(origin))
        {
            return Some(entry);
        }

        self.entries.iter().find(|e| {
            e.repo.as_deref().map(normalize_origin).is_some_and(|repo| {
                !repo.is_empty()
                    && (origin == repo || origin.ends_with(&format!("/{}", repo)))
            })
        })
    }
}

fn normalize_origin(origin: &str) -> &str {
    let origin = origin.trim().trim_end_matches('/');
    origin.strip_suffix(".git").unwrap_or(origin)
}

/// What [`add_go_library`] did to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoCatalogueChange {
    Created,
    VersionAdded,
    Unchanged,
}

/// Register a Go module version in the catalogue's `go` section.
///
/// An existing entry gets the version appended to its `targets`; otherwise a
/// new `gomod` entry is created. Comments in the file are not preserved.
pub fn add_go_library(
    path: &Path,
    library_id: &str,
    module: &str,
    version: &str,
    import_path: Option<&str>,
) -> Result<GoCatalogueChange> {
    if !path.exists() {
        bail!("catalogue not found at {}", path.display());
    }

    let content = fs::read_to_string(path)?;
    let mut root: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let change = insert_go_version(&mut root, library_id, module, version, import_path)?;
    if change != GoCatalogueChange::Unchanged {
        let out = serde_yaml::to_string(&root).context("failed to serialize catalogue")?;
        fs::write_string(path, &out)?;
    }

    Ok(change)
}

fn insert_go_version(
    root: &mut Value,
    library_id: &str,
    module: &str,
    version: &str,
    import_path: Option<&str>,
) -> Result<GoCatalogueChange> {
    let Some(root) = root.as_mapping_mut() else {
        bail!("catalogue root is not a mapping");
    };
    let libraries = child_mapping(root, "libraries")?;
    let go = child_mapping(libraries, "go")?;

    if let Some(existing) = go.get_mut(library_id) {
        let Some(existing) = existing.as_mapping_mut() else {
            bail!("catalogue entry go/{} is not a mapping", library_id);
        };
        let targets = existing
            .entry(Value::from("targets"))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        let Some(targets) = targets.as_sequence_mut() else {
            bail!("catalogue entry go/{} has malformed targets", library_id);
        };

        if targets.iter().any(|t| t.as_str() == Some(version)) {
            tracing::info!("version {} already listed for Go library {}", version, library_id);
            return Ok(GoCatalogueChange::Unchanged);
        }
        targets.push(Value::from(version));
        tracing::info!("added version {} to Go library {}", version, library_id);
        return Ok(GoCatalogueChange::VersionAdded);
    }

    let mut entry = Mapping::new();
    entry.insert("build_type".into(), "gomod".into());
    entry.insert("module".into(), module.into());
    entry.insert("targets".into(), Value::Sequence(vec![version.into()]));
    entry.insert("type".into(), "gomod".into());
    if let Some(import_path) = import_path {
        entry.insert("import_path".into(), import_path.into());
    }
    go.insert(library_id.into(), Value::Mapping(entry));

    tracing::info!("added Go library {} ({}) at {}", library_id, module, version);
    Ok(GoCatalogueChange::Created)
}

fn child_mapping<'a>(parent: &'a mut Mapping, key: &str) -> Result<&'a mut Mapping> {
    let child = parent
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if child.is_null() {
        *child = Value::Mapping(Mapping::new());
    }
    child
        .as_mapping_mut()
        .with_context(|| format!("catalogue key `{}` is not a mapping", key))
}
