//! CMake target discovery.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::util::process::{find_cmake, ProcessBuilder};

/// Targets every generator adds on its own.
const BUILTIN_TARGETS: &[&str] = &[
    "all",
    "clean",
    "depend",
    "edit_cache",
    "rebuild_cache",
    "install",
    "install/local",
    "install/strip",
    "list_install_components",
    "test",
    "help",
    "package",
    "package_source",
];

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}

/// Configure `source_dir` into `build_dir` and list the generated targets.
pub fn list_targets(source_dir: &Path, build_dir: &Path) -> Result<Vec<String>> {
    let Some(cmake) = find_cmake() else {
        bail!("cmake not found in PATH");
    };

    tracing::debug!("Configuring {} for target listing", source_dir.display());
    let output = ProcessBuilder::new(&cmake)
        .arg("-S")
        .arg(source_dir)
        .arg("-B")
        .arg(build_dir)
        .arg("-DBUILD_TESTING=OFF")
        .exec()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("CMake configuration failed:\n{}", stderr.trim());
    }

    let output = ProcessBuilder::new(&cmake)
        .arg("--build")
        .arg(build_dir)
        .args(["--target", "help"])
        .exec()
        .context("failed to list CMake targets")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("CMake target listing failed:\n{}", stderr.trim());
    }

    Ok(parse_help_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse the output of the `help` target.
///
/// Understands both the Makefile form (`... name (the default if no target is provided)`)
/// and the Ninja form (`name: phony`). Built-in and per-object targets are dropped.
pub fn parse_help_output(output: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();

    for line in output.lines() {
        let line = line.trim();

        let name = if let Some(rest) = line.strip_prefix("... ") {
            rest.split_whitespace().next()
        } else if let Some((name, kind)) = line.split_once(": ") {
            matches!(kind.trim(), "phony" | "CUSTOM_COMMAND").then_some(name.trim())
        } else {
            None
        };

        let Some(name) = name else { continue };
        if is_builtin_target(name) || targets.iter().any(|t| t == name) {
            continue;
        }
        targets.push(name.to_string());
    }

    targets
}

fn is_builtin_target(name: &str) -> bool {
    BUILTIN_TARGETS.contains(&name)
        || name.contains('/')
        || name.starts_with("cmake_")
        || name.ends_with(".o")
        || name.ends_with(".i")
        || name.ends_with(".s")
        || name.ends_with(".obj")
}
