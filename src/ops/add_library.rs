//! Implementation of `ce-lib-wizard add`.
//!
//! Every flow verifies the requested versions before it touches either
//! checkout, then hands over to the installer (C, C++, Fortran, Rust) or
//! edits the catalogue directly (Go), and finally merges the properties.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::{RepositoryAnalysis, RepositoryAnalyzer};
use crate::core::catalogue::{add_go_library, libraries_yaml_path, GoCatalogueChange};
use crate::core::identifier::suggest_library_id_from_module;
use crate::core::{Catalogue, Language, LibraryRequest};
use crate::installer::{parse_library_id, CeInstall, CppAddSpec, LinkSupport, INSTALL_ROOT};
use crate::ops::consistency::{check_library_paths, run_install_test, PathCheck};
use crate::ops::errors::WizardError;
use crate::properties::{
    fortran_block, go_block, merge_library_block, replace_libs_section, MergeOutcome,
};
use crate::resolver::{
    resolve_type, resolve_type_with_override, GoModuleResolver, ResolveError, TypeDecision,
    TypeSource, VersionResolver,
};
use crate::sources::{ModuleProxy, TagProbe};
use crate::util::config::Config;
use crate::util::fs;

/// Options for adding a library.
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// compiler-explorer/infra checkout
    pub infra: PathBuf,

    /// compiler-explorer main checkout
    pub main: PathBuf,

    /// Keep temporary clones for debugging
    pub keep_temp: bool,

    /// Run `make ce` before invoking the installer
    pub run_setup: bool,

    /// Install each version afterwards and check where it lands
    pub install_test: bool,

    /// Directory the install test requires
    pub install_root: PathBuf,
}

impl AddOptions {
    pub fn new(infra: impl Into<PathBuf>, main: impl Into<PathBuf>, config: &Config) -> Self {
        AddOptions {
            infra: infra.into(),
            main: main.into(),
            keep_temp: config.install.keep_temp,
            run_setup: config.install.run_setup,
            install_test: false,
            install_root: PathBuf::from(INSTALL_ROOT),
        }
    }
}

/// What an `add` did.
#[derive(Debug, Clone)]
pub struct AddReport {
    pub language: Language,
    pub library_id: String,

    /// Versions as registered
    pub versions: Vec<String>,

    /// Tag prefix shared by every version
    pub target_prefix: Option<String>,

    /// Chosen type, for languages that have one
    pub library_type: Option<TypeDecision>,

    /// Go module root, when it differs from the requested path
    pub module: Option<String>,

    /// Go package to import instead of the module root
    pub import_path: Option<String>,

    /// Files left modified in the checkouts
    pub modified: Vec<PathBuf>,

    /// Per-version path consistency results
    pub path_checks: Vec<PathCheck>,

    /// Install destinations, when the install test ran
    pub installed: Vec<String>,
}

impl AddReport {
    fn new(language: Language, library_id: String, versions: Vec<String>) -> Self {
        AddReport {
            language,
            library_id,
            versions,
            target_prefix: None,
            library_type: None,
            module: None,
            import_path: None,
            modified: Vec::new(),
            path_checks: Vec::new(),
            installed: Vec::new(),
        }
    }
}

/// Runs library additions against one pair of checkouts.
pub struct Wizard<'a> {
    opts: AddOptions,
    installer: CeInstall,
    tags: &'a dyn TagProbe,
    modules: &'a dyn ModuleProxy,
}

impl<'a> Wizard<'a> {
    pub fn new(
        opts: AddOptions,
        config: &Config,
        tags: &'a dyn TagProbe,
        modules: &'a dyn ModuleProxy,
    ) -> Self {
        let installer = CeInstall::new(&opts.infra, &config.install);
        Wizard {
            opts,
            installer,
            tags,
            modules,
        }
    }

    /// Add the library described by `request`.
    pub fn add(&self, request: &LibraryRequest) -> Result<AddReport> {
        tracing::info!(
            "Adding {} library {} ({})",
            request.language(),
            request.origin().as_str(),
            request.versions().join(", ")
        );

        match request.language() {
            Language::C | Language::Cpp => self.add_cpp(request),
            Language::Fortran => self.add_fortran(request),
            Language::Go => self.add_go(request),
            Language::Rust => self.add_rust(request),
        }
    }

    fn add_cpp(&self, request: &LibraryRequest) -> Result<AddReport> {
        let language = request.language();
        let url = request.origin().as_str();

        let resolved = VersionResolver::new(self.tags)
            .resolve_all(url, request.versions())
            .map_err(WizardError::from)?;

        let props_files = cpp_properties_files(language, &self.opts.main);
        for file in &props_files {
            require_file(file)?;
        }

        let catalogue = Catalogue::load_from_infra(&self.opts.infra)?;
        let existing = catalogue.find_entry(url, request.library_id());
        if let Some(entry) = existing {
            tracing::info!(
                "Found existing catalogue entry {}/{}",
                entry.section,
                entry.identifier
            );
        }

        // Clone only when the catalogue cannot decide, or link targets are needed.
        let mut analysis: Option<RepositoryAnalysis> = None;
        let decision = match request.library_type() {
            Some(ty) => resolve_type_with_override(
                Some(ty),
                &RepositoryAnalysis::default(),
                existing,
                language,
            ),
            None => {
                let recorded = resolve_type(&RepositoryAnalysis::default(), existing, language);
                if recorded.source == TypeSource::Detected {
                    let fresh = self.analyze(url);
                    let detected = resolve_type(&fresh, existing, language);
                    analysis = Some(fresh);
                    detected
                } else {
                    recorded
                }
            }
        };
        tracing::info!(
            "Library type: {} ({})",
            decision.library_type,
            decision.source
        );

        let link_targets = if decision.library_type.needs_link_targets() {
            let analysis = analysis.get_or_insert_with(|| self.analyze(url));
            analysis.link_targets().to_vec()
        } else {
            Vec::new()
        };

        self.setup_installer();

        let link_support = if link_targets.is_empty() {
            LinkSupport::default()
        } else {
            self.installer.link_support()
        };

        let mut reported_id = None;
        for version in &resolved.versions {
            let spec = CppAddSpec {
                url,
                version,
                library_type: decision.library_type,
                target_prefix: resolved.target_prefix.as_deref(),
                link_targets: &link_targets,
                link_support,
            };
            let stdout = self
                .installer
                .add_cpp_library(&spec)
                .map_err(WizardError::from)?;
            if reported_id.is_none() {
                reported_id = parse_library_id(&stdout);
            }
        }

        let library_id = match (reported_id, request.library_id(), existing) {
            (Some(id), _, _) => id,
            (None, Some(id), _) => id.to_string(),
            (None, None, Some(entry)) => entry.identifier.clone(),
            (None, None, None) => request.suggested_id(),
        };
        tracing::info!("Library id: {}", library_id);

        for version in &resolved.versions {
            for file in &props_files {
                self.installer
                    .generate_linux_props(file, &library_id, version)
                    .map_err(WizardError::from)?;
            }
        }

        if let Err(e) = self.installer.generate_windows_props() {
            tracing::warn!("could not generate Windows properties: {}", e);
        }

        let mut report = AddReport::new(language, library_id, resolved.versions.clone());
        report.target_prefix = resolved.target_prefix.clone();
        report.library_type = Some(decision);

        for version in &resolved.versions {
            let check = check_library_paths(
                &self.installer,
                language.catalogue_section(),
                &props_files,
                &report.library_id,
                version,
            )?;
            report.path_checks.push(check);
        }

        self.install_test(&mut report, &props_files)?;

        report.modified.push(libraries_yaml_path(&self.opts.infra));
        report.modified.extend(props_files);
        Ok(report)
    }

    fn add_fortran(&self, request: &LibraryRequest) -> Result<AddReport> {
        let url = request.origin().as_str();

        VersionResolver::new(self.tags)
            .resolve_all(url, request.versions())
            .map_err(WizardError::from)?;

        let props = require_file(&Language::Fortran.properties_path(&self.opts.main))?;

        let analyzer = RepositoryAnalyzer::new(self.opts.keep_temp);
        let is_fpm = analyzer
            .has_root_file(url, "fpm.toml")
            .with_context(|| format!("failed to clone {}", url))?;
        if !is_fpm {
            return Err(WizardError::NotFpmPackage {
                url: url.to_string(),
            }
            .into());
        }

        self.setup_installer();

        let mut reported_id = None;
        for version in request.versions() {
            let stdout = self
                .installer
                .add_fortran_library(url, version)
                .map_err(WizardError::from)?;
            if reported_id.is_none() {
                reported_id = parse_library_id(&stdout);
            }
        }
        let library_id = reported_id.unwrap_or_else(|| request.suggested_id());

        fs::update_file(&props, |text| {
            let mut text = text.to_string();
            for version in request.versions() {
                let block = fortran_block(&library_id, url, version);
                let (merged, outcome) = merge_library_block(&text, &library_id, version, &block);
                log_merge(&library_id, version, outcome);
                text = merged;
            }
            Ok(text)
        })?;

        let mut report = AddReport::new(
            Language::Fortran,
            library_id,
            request.versions().to_vec(),
        );
        report.modified = vec![libraries_yaml_path(&self.opts.infra), props];
        Ok(report)
    }

    fn add_go(&self, request: &LibraryRequest) -> Result<AddReport> {
        let path = request.origin().as_str();
        let versions = request.versions();
        let resolver = GoModuleResolver::new(self.modules);

        let Some(resolution) = resolver.resolve_module_any(path, versions) else {
            return Err(WizardError::from(ResolveError::ModuleNotFound {
                module: path.to_string(),
                version: versions[0].clone(),
            })
            .into());
        };
        let module = resolution.module.as_str();

        let missing: Vec<String> = versions
            .iter()
            .filter(|v| !resolver.version_exists(module, v))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::from(ResolveError::MissingVersions {
                origin: module.to_string(),
                versions: missing,
            })
            .into());
        }

        let catalogue = require_file(&libraries_yaml_path(&self.opts.infra))?;
        let props = require_file(&Language::Go.properties_path(&self.opts.main))?;

        let import_path = match resolution.import_override.clone() {
            Some(import_path) => Some(import_path),
            None => resolver.detect_import_path(module, &versions[0]),
        };
        if let Some(ref import_path) = import_path {
            tracing::info!("Import path: {}", import_path);
        }

        let library_id = request
            .library_id()
            .map(str::to_string)
            .unwrap_or_else(|| suggest_library_id_from_module(module));

        for version in versions {
            match add_go_library(
                &catalogue,
                &library_id,
                module,
                version,
                import_path.as_deref(),
            )? {
                GoCatalogueChange::Created => {
                    tracing::info!("Created catalogue entry go/{}", library_id)
                }
                GoCatalogueChange::VersionAdded => {
                    tracing::info!("Added {} to catalogue entry go/{}", version, library_id)
                }
                GoCatalogueChange::Unchanged => {
                    tracing::info!("{} already in catalogue entry go/{}", version, library_id)
                }
            }
        }

        fs::update_file(&props, |text| {
            let mut text = text.to_string();
            for version in versions {
                let block = go_block(&library_id, module, version);
                let (merged, outcome) = merge_library_block(&text, &library_id, version, &block);
                log_merge(&library_id, version, outcome);
                text = merged;
            }
            Ok(text)
        })?;

        let mut report = AddReport::new(Language::Go, library_id, versions.to_vec());
        report.module = (module != path).then(|| module.to_string());
        report.import_path = import_path;
        report.modified = vec![catalogue, props];
        Ok(report)
    }

    fn add_rust(&self, request: &LibraryRequest) -> Result<AddReport> {
        let name = request.origin().as_str();
        let props = require_file(&Language::Rust.properties_path(&self.opts.main))?;

        self.setup_installer();

        for version in request.versions() {
            self.installer
                .add_crate(name, version)
                .map_err(WizardError::from)?;
        }

        let generated = self.installer.generate_rust_props()?;
        fs::update_file(&props, |text| {
            replace_libs_section(text, &generated).map_err(|source| {
                WizardError::Properties {
                    path: props.clone(),
                    source,
                }
                .into()
            })
        })?;

        let mut report = AddReport::new(Language::Rust, name.to_string(), request.versions().to_vec());
        report.modified = vec![libraries_yaml_path(&self.opts.infra), props];
        Ok(report)
    }

    fn analyze(&self, url: &str) -> RepositoryAnalysis {
        tracing::info!("Analyzing {}", url);
        match RepositoryAnalyzer::new(self.opts.keep_temp).analyze(url) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("could not clone {}: {:#}", url, e);
                RepositoryAnalysis::default()
            }
        }
    }

    fn setup_installer(&self) {
        if !self.opts.run_setup {
            return;
        }
        if let Err(e) = self.installer.setup() {
            tracing::warn!("installer setup failed: {:#}", e);
        }
    }

    fn install_test(&self, report: &mut AddReport, files: &[PathBuf]) -> Result<()> {
        if !self.opts.install_test {
            return Ok(());
        }
        for version in &report.versions {
            let destination = run_install_test(
                &self.installer,
                &self.opts.install_root,
                files,
                &report.library_id,
                version,
            )?;
            report.installed.push(destination);
        }
        Ok(())
    }
}

/// Properties files the installer regenerates for a C or C++ library.
///
/// C libraries are usable from both front ends.
pub fn cpp_properties_files(language: Language, main: &Path) -> Vec<PathBuf> {
    let mut files = vec![Language::Cpp.properties_path(main)];
    if language == Language::C {
        files.push(Language::C.properties_path(main));
    }
    files
}

fn require_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(WizardError::MissingFile {
            path: path.to_path_buf(),
        }
        .into())
    }
}

fn log_merge(library_id: &str, version: &str, outcome: MergeOutcome) {
    match outcome {
        MergeOutcome::Added => tracing::info!("Added {} {} to properties", library_id, version),
        MergeOutcome::VersionAdded => {
            tracing::info!("Added version {} to {} in properties", version, library_id)
        }
        MergeOutcome::Unchanged => {
            tracing::info!("{} {} already in properties", library_id, version)
        }
    }
}
