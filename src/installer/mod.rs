//! Driver for the infra repository's `ce_install` tool.
//!
//! The installer owns the catalogue for C, C++, Fortran and Rust; this
//! module only builds its command lines and interprets its output.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::core::LibraryType;
use crate::util::config::InstallConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs;
use crate::util::process::{find_make, ProcessBuilder};

/// Phrasings the installer uses when it reports the library it touched.
static LIBRARY_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Added version .+ to library (\S+)",
        r"Library '([^']+)' is now available",
        r"--library (\S+)",
        r"Found existing library '([^']+)'",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static LIST_PATHS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"libraries/([^/\s]+)/\S+\s+\S+:\s+(.+)").expect("valid regex")
});

static STAGING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Moving from staging \((.*?)\) to final destination \((.*?)\)")
        .expect("valid regex")
});

/// Root that installer-relative destinations live under.
pub const INSTALL_ROOT: &str = "/opt/compiler-explorer";

/// Installer failure.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("installer not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("`{command}` failed with exit code {}", status.map_or("unknown".to_string(), |c| c.to_string()))]
    Failed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` did not write {}", path.display())]
    MissingOutput { command: String, path: PathBuf },
}

impl InstallerError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InstallerError::NotFound { path } => {
                Diagnostic::error(format!("installer not found at {}", path.display()))
                    .with_suggestion("Check that --infra points at a compiler-explorer/infra checkout")
                    .with_suggestion("Run `make ce` in the infra checkout")
            }

            InstallerError::Failed {
                command,
                stdout,
                stderr,
                ..
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                for line in stdout.lines().chain(stderr.lines()).filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_context(format!("command: {}", command))
                    .with_suggestion(suggestions::INSTALLER_FAILED)
            }

            InstallerError::MissingOutput { command, path } => Diagnostic::error(format!(
                "`{}` finished but {} is missing",
                command,
                path.display()
            ))
            .with_suggestion(suggestions::INSTALLER_FAILED),
        }
    }
}

/// Link flags the installed `cpp-library add` understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSupport {
    pub static_link: bool,
    pub shared_link: bool,
}

impl LinkSupport {
    /// Read support from `cpp-library add --help` output.
    pub fn from_help(help: &str) -> Self {
        LinkSupport {
            static_link: help.contains("--static-lib-link"),
            shared_link: help.contains("--shared-lib-link"),
        }
    }
}

/// Arguments for `cpp-library add`.
#[derive(Debug, Clone)]
pub struct CppAddSpec<'a> {
    pub url: &'a str,
    pub version: &'a str,
    pub library_type: LibraryType,
    pub target_prefix: Option<&'a str>,
    pub link_targets: &'a [String],
    pub link_support: LinkSupport,
}

/// Build the `cpp-library add` argument list.
///
/// Link targets are passed only when the library type needs them and the
/// installer supports the matching flag.
pub fn build_add_command(spec: &CppAddSpec<'_>) -> Vec<String> {
    let mut args = vec![
        "cpp-library".to_string(),
        "add".to_string(),
        spec.url.to_string(),
        spec.version.to_string(),
        "--type".to_string(),
        spec.library_type.as_str().to_string(),
    ];

    if let Some(prefix) = spec.target_prefix {
        args.push("--target-prefix".to_string());
        args.push(prefix.to_string());
    }

    if !spec.link_targets.is_empty() {
        let flag = match spec.library_type {
            LibraryType::Static if spec.link_support.static_link => Some("--static-lib-link"),
            LibraryType::Shared | LibraryType::CShared if spec.link_support.shared_link => {
                Some("--shared-lib-link")
            }
            _ => None,
        };
        if let Some(flag) = flag {
            args.push(flag.to_string());
            args.push(spec.link_targets.join(","));
        }
    }

    args
}

/// Library identifier reported by the installer, if any.
pub fn parse_library_id(output: &str) -> Option<String> {
    LIBRARY_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(output))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Absolute destination from `list-paths` output for a library of `language_dir`.
///
/// Output lines look like `libraries/c++/fmt 10.2.1: libs/fmt/10.2.1`.
pub fn parse_list_paths_destination(output: &str, language_dir: &str) -> Option<String> {
    LIST_PATHS_RE
        .captures_iter(output)
        .find(|c| c.get(1).is_some_and(|m| m.as_str() == language_dir))
        .and_then(|c| c.get(2))
        .map(|m| format!("{}/{}", INSTALL_ROOT, m.as_str().trim()))
}

/// Final destination from `install` output.
pub fn parse_install_destination(output: &str) -> Option<String> {
    STAGING_RE
        .captures(output)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string())
}

/// A `ce_install` inside an infra checkout.
#[derive(Debug, Clone)]
pub struct CeInstall {
    infra: PathBuf,
    executable: PathBuf,
}

impl CeInstall {
    pub fn new(infra: impl Into<PathBuf>, config: &InstallConfig) -> Self {
        let infra = infra.into();
        let executable = infra.join(&config.executable);
        CeInstall { infra, executable }
    }

    pub fn infra(&self) -> &Path {
        &self.infra
    }

    /// Run `make ce` so the installer's environment exists. Failure only warns.
    pub fn setup(&self) -> Result<()> {
        let Some(make) = find_make() else {
            tracing::warn!("make not found, skipping installer setup");
            return Ok(());
        };

        tracing::info!("Setting up ce_install");
        let output = ProcessBuilder::new(make)
            .arg("ce")
            .cwd(&self.infra)
            .clean_env()
            .exec()
            .context("failed to run `make ce`")?;

        if !output.status.success() {
            tracing::warn!("`make ce` exited with {:?}", output.status.code());
        }
        Ok(())
    }

    /// Run the installer with `args`, failing on a non-zero exit.
    pub fn run<I, S>(&self, args: I) -> Result<Output, InstallerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.executable.exists() {
            return Err(InstallerError::NotFound {
                path: self.executable.clone(),
            });
        }

        let cmd = ProcessBuilder::new(&self.executable)
            .args(args.into_iter().map(|a| a.as_ref().to_string()))
            .cwd(&self.infra)
            .clean_env();
        let command = cmd.display_command();
        tracing::info!("Running {}", command);

        let output = cmd.exec().map_err(|e| InstallerError::Failed {
            command: command.clone(),
            status: None,
            stdout: String::new(),
            stderr: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(InstallerError::Failed {
                command,
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output)
    }

    /// Which link flags `cpp-library add` accepts. Unknown means none.
    pub fn link_support(&self) -> LinkSupport {
        match self.run(["cpp-library", "add", "--help"]) {
            Ok(output) => LinkSupport::from_help(&combined_output(&output)),
            Err(e) => {
                tracing::warn!("could not query installer link support: {}", e);
                LinkSupport::default()
            }
        }
    }

    /// `cpp-library add`; returns the installer's stdout.
    pub fn add_cpp_library(&self, spec: &CppAddSpec<'_>) -> Result<String, InstallerError> {
        let output = self.run(build_add_command(spec))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Regenerate Linux properties for one library version in place.
    pub fn generate_linux_props(
        &self,
        props_file: &Path,
        library_id: &str,
        version: &str,
    ) -> Result<(), InstallerError> {
        let file = props_file.display().to_string();
        self.run([
            "cpp-library",
            "generate-linux-props",
            "--input-file",
            file.as_str(),
            "--output-file",
            file.as_str(),
            "--library",
            library_id,
            "--version",
            version,
        ])?;
        Ok(())
    }

    pub fn generate_windows_props(&self) -> Result<(), InstallerError> {
        self.run(["cpp-library", "generate-windows-props"])?;
        Ok(())
    }

    pub fn add_fortran_library(&self, url: &str, version: &str) -> Result<String, InstallerError> {
        let output = self.run(["fortran-library", "add", url, version])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn add_crate(&self, name: &str, version: &str) -> Result<(), InstallerError> {
        self.run(["add-crate", name, version])?;
        Ok(())
    }

    /// Run `generate-rust-props` and take its `props` file out of the checkout.
    pub fn generate_rust_props(&self) -> Result<String> {
        self.run(["generate-rust-props"])?;

        let props = self.infra.join("props");
        if !props.exists() {
            return Err(InstallerError::MissingOutput {
                command: "generate-rust-props".to_string(),
                path: props,
            }
            .into());
        }

        let content = fs::read_to_string(&props)?;
        std::fs::remove_file(&props)
            .with_context(|| format!("failed to remove {}", props.display()))?;
        Ok(content)
    }

    /// `list-paths "<id> <version>"`, stdout and stderr combined.
    pub fn list_paths(&self, library_id: &str, version: &str) -> Result<String, InstallerError> {
        let spec = format!("{} {}", library_id, version);
        let output = self.run(["list-paths", spec.as_str()])?;
        Ok(combined_output(&output))
    }

    /// `install --force "<id> <version>"`, stdout and stderr combined.
    pub fn install_force(&self, library_id: &str, version: &str) -> Result<String, InstallerError> {
        let spec = format!("{} {}", library_id, version);
        let output = self.run(["install", "--force", spec.as_str()])?;
        Ok(combined_output(&output))
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_add_command_with_links() {
        let targets = vec!["fmt".to_string(), "fmt-header-only".to_string()];
        let spec = CppAddSpec {
            url: "https://github.com/fmtlib/fmt",
            version: "10.2.1",
            library_type: LibraryType::Static,
            target_prefix: None,
            link_targets: &targets,
            link_support: LinkSupport {
                static_link: true,
                shared_link: true,
            },
        };
        assert_eq!(
            build_add_command(&spec),
            vec![
                "cpp-library",
                "add",
                "https://github.com/fmtlib/fmt",
                "10.2.1",
                "--type",
                "static",
                "--static-lib-link",
                "fmt,fmt-header-only",
            ]
        );
    }

    #[test]
    fn test_build_add_command_prefix_and_unsupported_links() {
        let targets = vec!["z".to_string()];
        let spec = CppAddSpec {
            url: "https://github.com/madler/zlib",
            version: "1.3.1",
            library_type: LibraryType::CShared,
            target_prefix: Some("v"),
            link_targets: &targets,
            link_support: LinkSupport {
                static_link: true,
                shared_link: false,
            },
        };
        assert_eq!(
            build_add_command(&spec),
            vec![
                "cpp-library",
                "add",
                "https://github.com/madler/zlib",
                "1.3.1",
                "--type",
                "cshared",
                "--target-prefix",
                "v",
            ]
        );
    }

    #[test]
    fn test_header_only_never_gets_links() {
        let targets = vec!["json".to_string()];
        let spec = CppAddSpec {
            url: "https://github.com/nlohmann/json",
            version: "3.11.3",
            library_type: LibraryType::HeaderOnly,
            target_prefix: Some("v"),
            link_targets: &targets,
            link_support: LinkSupport {
                static_link: true,
                shared_link: true,
            },
        };
        assert!(!build_add_command(&spec).iter().any(|a| a.ends_with("-lib-link")));
    }

    #[test]
    fn test_parse_library_id() {
        assert_eq!(
            parse_library_id("Added version 10.2.1 to library fmt\n"),
            Some("fmt".to_string())
        );
        assert_eq!(
            parse_library_id("Library 'nlohmann_json' is now available"),
            Some("nlohmann_json".to_string())
        );
        assert_eq!(
            parse_library_id("run: ce_install cpp-library generate-linux-props --library abseil --version x"),
            Some("abseil".to_string())
        );
        assert_eq!(
            parse_library_id("Found existing library 'zlib', adding version"),
            Some("zlib".to_string())
        );
        assert_eq!(parse_library_id("done"), None);
    }

    #[test]
    fn test_link_support_from_help() {
        let help = "usage: ce_install cpp-library add [--type TYPE] [--static-lib-link LIBS]";
        assert_eq!(
            LinkSupport::from_help(help),
            LinkSupport {
                static_link: true,
                shared_link: false
            }
        );
    }

    #[test]
    fn test_parse_list_paths_destination() {
        let output = "libraries/c++/fmt 10.2.1: libs/fmt/10.2.1\n";
        assert_eq!(
            parse_list_paths_destination(output, "c++"),
            Some("/opt/compiler-explorer/libs/fmt/10.2.1".to_string())
        );
        assert_eq!(parse_list_paths_destination(output, "fortran"), None);
        assert_eq!(parse_list_paths_destination("nothing useful", "c++"), None);
    }

    #[test]
    fn test_parse_install_destination() {
        let output = "Moving from staging (/tmp/staging/abc) to final destination (/opt/compiler-explorer/libs/fmt/10.2.1)\n";
        assert_eq!(
            parse_install_destination(output),
            Some("/opt/compiler-explorer/libs/fmt/10.2.1".to_string())
        );
    }

    #[test]
    fn test_missing_installer() {
        let tmp = tempfile::TempDir::new().unwrap();
        let installer = CeInstall::new(tmp.path(), &InstallConfig::default());
        let err = installer.run(["list-paths", "fmt 1"]).unwrap_err();
        assert!(matches!(err, InstallerError::NotFound { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_failure_captures_output() {
        use crate::test_support::fixtures::fake_installer;

        let tmp = tempfile::TempDir::new().unwrap();
        fake_installer(tmp.path(), "echo partial; echo boom >&2; exit 3");

        let installer = CeInstall::new(tmp.path(), &InstallConfig::default());
        match installer.add_fortran_library("https://github.com/a/b", "1.0") {
            Err(InstallerError::Failed {
                status,
                stdout,
                stderr,
                ..
            }) => {
                assert_eq!(status, Some(3));
                assert_eq!(stdout.trim(), "partial");
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_generate_rust_props_reads_and_removes_file() {
        use crate::test_support::fixtures::fake_installer;

        let tmp = tempfile::TempDir::new().unwrap();
        fake_installer(tmp.path(), "printf 'libs=serde\\n' > props");

        let installer = CeInstall::new(tmp.path(), &InstallConfig::default());
        let props = installer.generate_rust_props().unwrap();
        assert_eq!(props, "libs=serde\n");
        assert!(!tmp.path().join("props").exists());
    }
}
