//! CLI integration tests for ce-lib-wizard.
//!
//! These tests run offline: they exercise argument handling, request
//! validation and the Rust flow against a scripted installer.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the ce-lib-wizard binary command.
fn wizard() -> Command {
    let mut cmd = Command::cargo_bin("ce-lib-wizard").unwrap();
    cmd.env_remove("GITHUB_TOKEN").env_remove("GOPROXY");
    cmd
}

/// Create a temporary directory for test checkouts.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ============================================================================
// ce-lib-wizard --help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    wizard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("resolve-version"))
        .stdout(predicate::str::contains("detect-type"))
        .stdout(predicate::str::contains("go-module"));
}

#[test]
fn test_add_help_shows_flags() {
    wizard()
        .args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--lang"))
        .stdout(predicate::str::contains("--crate"))
        .stdout(predicate::str::contains("--install-test"));
}

// ============================================================================
// ce-lib-wizard add: request validation
// ============================================================================

#[test]
fn test_rust_without_crate_fails() {
    let tmp = temp_dir();

    wizard()
        .args(["add", "--lang", "rust", "--version", "1.0.0"])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rust libraries need a crate name"));
}

#[test]
fn test_go_without_module_fails() {
    let tmp = temp_dir();

    wizard()
        .args(["add", "--lang", "go", "--version", "1.0.0"])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Go libraries need a module path"));
}

#[test]
fn test_invalid_library_id_fails() {
    let tmp = temp_dir();

    wizard()
        .args([
            "add",
            "--lang",
            "c++",
            "--url",
            "https://github.com/fmtlib/fmt",
            "--version",
            "10.2.1",
            "--library-id",
            "Fmt-Lib",
        ])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid library id `Fmt-Lib`"));
}

#[test]
fn test_unknown_language_fails() {
    let tmp = temp_dir();

    wizard()
        .args(["add", "--lang", "cobol", "--url", "https://example.com/x", "--version", "1"])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid language 'cobol'"));
}

#[test]
fn test_url_and_module_conflict() {
    let tmp = temp_dir();

    wizard()
        .args([
            "add",
            "--lang",
            "go",
            "--url",
            "https://github.com/google/uuid",
            "--module",
            "github.com/google/uuid",
            "--version",
            "1.6.0",
        ])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_type_fails() {
    let tmp = temp_dir();

    wizard()
        .args([
            "add",
            "--lang",
            "c++",
            "--url",
            "https://github.com/fmtlib/fmt",
            "--version",
            "10.2.1",
            "--type",
            "dynamic",
        ])
        .arg("--infra")
        .arg(tmp.path())
        .arg("--main")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid library type 'dynamic'"));
}

// ============================================================================
// Other commands
// ============================================================================

#[test]
fn test_resolve_version_needs_versions() {
    wizard()
        .args(["resolve-version", "https://github.com/fmtlib/fmt", " , "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no versions given"));
}

#[test]
fn test_detect_type_rejects_other_languages() {
    wizard()
        .args([
            "detect-type",
            "https://github.com/serde-rs/serde",
            "--lang",
            "rust",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only supports C and C++"));
}

#[test]
fn test_completions_bash() {
    wizard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ce-lib-wizard"));
}

// ============================================================================
// ce-lib-wizard add: Rust flow against a scripted installer
// ============================================================================

#[cfg(unix)]
fn fake_installer(infra: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let script = infra.join("bin").join("ce_install");
    write_file(&script, &format!("#!/bin/sh\n{}\n", body));
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_add_rust_crate() {
    let tmp = temp_dir();
    let infra = tmp.path().join("infra");
    let main = tmp.path().join("main");

    fake_installer(
        &infra,
        r#"echo "$*" >> calls.log
case "$1" in
  generate-rust-props) printf 'libs=anyhow\nlibs.anyhow.name=anyhow\n' > props ;;
esac"#,
    );
    let props = main.join("etc/config/rust.amazon.properties");
    write_file(
        &props,
        "compilers=&rust\n\nlibs=\n\n#################################\n#################################\n# Installed tools\ntools=\n",
    );

    wizard()
        .args(["add", "--lang", "rust", "--crate", "anyhow", "--version", "1.0.86", "--no-setup"])
        .arg("--infra")
        .arg(&infra)
        .arg("--main")
        .arg(&main)
        .assert()
        .success()
        .stderr(predicate::str::contains("anyhow"));

    let calls = fs::read_to_string(infra.join("calls.log")).unwrap();
    assert_eq!(calls, "add-crate anyhow 1.0.86\ngenerate-rust-props\n");

    let updated = fs::read_to_string(&props).unwrap();
    assert!(updated.contains("libs=anyhow\nlibs.anyhow.name=anyhow\n"));
    assert!(updated.contains("# Installed tools"));
}

#[cfg(unix)]
#[test]
fn test_add_reports_installer_failure() {
    let tmp = temp_dir();
    let infra = tmp.path().join("infra");
    let main = tmp.path().join("main");

    fake_installer(&infra, "echo 'crate not found' >&2; exit 2");
    let props = main.join("etc/config/rust.amazon.properties");
    write_file(&props, "libs=\n");

    wizard()
        .args(["add", "--lang", "rust", "--crate", "nope", "--version", "0.1.0", "--no-setup"])
        .arg("--infra")
        .arg(&infra)
        .arg("--main")
        .arg(&main)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed with exit code 2"))
        .stderr(predicate::str::contains("crate not found"));

    assert_eq!(fs::read_to_string(&props).unwrap(), "libs=\n");
}
