//! Test fixtures for common test scenarios.
//!
//! Canned catalogue and properties text, plus builders for git
//! repositories, Go module archives and a scriptable fake installer.

use std::io::{Cursor, Write};
use std::path::Path;

use git2::{Repository, Signature};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A small `bin/yaml/libraries.yaml`.
pub const CATALOGUE_YAML: &str = r#"---
libraries:
  c++:
    fmt:
      build_type: cmake
      check_file: README.md
      repo: fmtlib/fmt
      staticliblink:
        - fmtd
      target_prefix: ''
      targets:
        - 10.2.1
        - 11.0.0
      type: github
    nlohmann_json:
      build_type: none
      check_file: README.md
      targets:
        - name: 3.11.3
      type: github
      url: https://github.com/nlohmann/json
    widget:
      repo: acme/widget
      targets:
        - '1.0'
      type: github
  fortran:
    stdlib:
      build_type: fpm
      repo: fortran-lang/stdlib
      targets:
        - 0.5.0
      type: github
  go:
    uuid:
      build_type: gomod
      module: github.com/google/uuid
      targets:
        - v1.5.0
      type: gomod
"#;

/// Properties file with an installed-tools section after the libraries.
pub const PROPERTIES_WITH_TOOLS: &str = "\
compilers=&gcc
defaultCompiler=gcc131

libs=fmt
libs.fmt.name={fmt}
libs.fmt.url=https://github.com/fmtlib/fmt
libs.fmt.versions=1021
libs.fmt.versions.1021.version=10.2.1

#################################
#################################
# Installed tools

tools=
";

/// Rust properties with a generated libraries region.
pub const RUST_PROPERTIES: &str = "\
compilers=&rust

libs=old
libs.old.name=old
libs.old.versions=1
libs.old.versions.1.version=1.0.0

#################################
#################################
# Installed tools
tools=
";

/// Go properties holding one module.
pub const GO_PROPERTIES: &str = "\
compilers=&gl
defaultCompiler=gl1220

libs=uuid
libs.uuid.name=google/uuid
libs.uuid.url=https://github.com/google/uuid
libs.uuid.lookupname=go_uuid
libs.uuid.packagedheaders=true
libs.uuid.versions=v150
libs.uuid.versions.v150.version=v1.5.0

#################################
#################################
# Installed tools

tools=
";

/// Build a module zip as served by a Go module proxy.
///
/// `files` are paths relative to the module root.
pub fn go_module_zip(module: &str, version: &str, files: &[&str]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for file in files {
        writer
            .start_file(format!("{}@{}/{}", module, version, file), options)
            .expect("failed to start zip entry");
        writer
            .write_all(b"package fixture\n")
            .expect("failed to write zip entry");
    }

    writer
        .finish()
        .expect("failed to finish zip")
        .into_inner()
}

/// Create a git repository with one commit holding `files` and lightweight `tags`.
pub fn init_git_repo(path: &Path, files: &[(&str, &str)], tags: &[&str]) -> Repository {
    let repo = Repository::init(path).expect("failed to init repository");

    {
        let mut index = repo.index().expect("failed to open index");
        for (name, content) in files {
            let file = path.join(name);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("failed to create directory");
            }
            std::fs::write(&file, content).expect("failed to write file");
            index.add_path(Path::new(name)).expect("failed to stage file");
        }
        index.write().expect("failed to write index");

        let tree_id = index.write_tree().expect("failed to write tree");
        let tree = repo.find_tree(tree_id).expect("failed to find tree");
        let sig = Signature::now("Fixture", "fixture@example.com").expect("bad signature");
        let commit_id = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .expect("failed to commit");
        let commit = repo.find_object(commit_id, None).expect("failed to find commit");

        for tag in tags {
            repo.tag_lightweight(tag, &commit, false)
                .expect("failed to create tag");
        }
    }

    repo
}

/// Install a shell script as `bin/ce_install` in `infra`.
#[cfg(unix)]
pub fn fake_installer(infra: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = infra.join("bin");
    std::fs::create_dir_all(&bin).expect("failed to create bin");
    let script = bin.join("ce_install");
    std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).expect("failed to write installer");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        .expect("failed to chmod installer");
}

/// Create `etc/config/<file>` under a main checkout.
pub fn write_properties(main: &Path, file: &str, content: &str) {
    let dir = main.join("etc").join("config");
    std::fs::create_dir_all(&dir).expect("failed to create etc/config");
    std::fs::write(dir.join(file), content).expect("failed to write properties");
}

/// Create `bin/yaml/libraries.yaml` under an infra checkout.
pub fn write_catalogue(infra: &Path, content: &str) {
    let dir = infra.join("bin").join("yaml");
    std::fs::create_dir_all(&dir).expect("failed to create bin/yaml");
    std::fs::write(dir.join("libraries.yaml"), content).expect("failed to write catalogue");
}
