//! Edits to Compiler Explorer `*.amazon.properties` files.
//!
//! The files are hand-maintained, so nothing here re-serializes them. Each
//! operation is a text-to-text function touching only the lines it owns:
//!
//! - the `libs=` list line
//! - a per-library block inserted before the installed-tools section
//! - the whole `libs=` region, replaced wholesale for Rust

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::identifier::{module_display_name, module_to_github_url, version_key};

static LIBS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^libs=(.*)$").expect("valid regex"));

static SECTION_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{33}").expect("valid regex"));

static TOOLS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^tools=").expect("valid regex"));

/// Start of the installed-tools section that follows the libraries.
pub static INSTALLED_TOOLS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{33}\r?\n#{33}\r?\n# Installed tools").expect("valid regex")
});

/// Error editing a properties file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("no `libs=` line found")]
    MissingLibsLine,
}

/// What a merge did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New library: list line and block written
    Added,
    /// Existing library: version appended
    VersionAdded,
    /// Library and version were already present
    Unchanged,
}

/// Add `id` to the first `libs=` line if it is not already listed.
///
/// Membership is checked on whole colon-separated entries, so `abseil2`
/// does not count as `abseil`. Text without a `libs=` line is returned as is.
pub fn add_identifier_to_list_line(text: &str, id: &str) -> String {
    let Some(caps) = LIBS_LINE_RE.captures(text) else {
        return text.to_string();
    };
    let (Some(line), Some(raw)) = (caps.get(0), caps.get(1)) else {
        return text.to_string();
    };

    let value = raw.as_str().trim_end();
    if list_contains(value, id) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + id.len() + 1);
    out.push_str(&text[..line.start()]);
    out.push_str("libs=");
    if !value.trim().is_empty() {
        out.push_str(value);
        out.push(':');
    }
    out.push_str(id);
    if raw.as_str().ends_with('\r') {
        out.push('\r');
    }
    out.push_str(&text[line.end()..]);
    out
}

/// Whether the `libs=` line lists `id`.
pub fn lists_identifier(text: &str, id: &str) -> bool {
    LIBS_LINE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .is_some_and(|v| list_contains(v.as_str(), id))
}

fn list_contains(value: &str, id: &str) -> bool {
    value.split(':').map(str::trim).any(|entry| entry == id)
}

/// Insert `block` before the first `marker` match after the `libs=` line.
///
/// The block gets one blank line on each side. Without a marker it is
/// appended at the end of the file. The file's line ending is kept.
pub fn insert_block_before_section(text: &str, block: &[String], marker: &Regex) -> String {
    let eol = line_ending(text);
    let block = block.join(eol);
    let search_from = LIBS_LINE_RE.find(text).map(|m| m.end()).unwrap_or(0);

    match marker.find_at(text, search_from) {
        Some(m) => {
            let before = text[..m.start()].trim_end_matches(['\n', '\r']);
            let mut out = String::with_capacity(text.len() + block.len() + 4 * eol.len());
            out.push_str(before);
            if !before.is_empty() {
                out.push_str(eol);
                out.push_str(eol);
            }
            out.push_str(&block);
            out.push_str(eol);
            out.push_str(eol);
            out.push_str(&text[m.start()..]);
            out
        }
        None => {
            let before = text.trim_end_matches(['\n', '\r']);
            if before.is_empty() {
                format!("{}{}", block, eol)
            } else {
                format!("{}{eol}{eol}{}{eol}", before, block, eol = eol)
            }
        }
    }
}

/// `\r\n` if the file already uses it, `\n` otherwise.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Replace everything from the `libs=` line up to the section delimiter or
/// `tools=` line (whichever comes first) with `new_block`.
pub fn replace_libs_section(text: &str, new_block: &str) -> Result<String, PropertiesError> {
    let start = LIBS_LINE_RE
        .find(text)
        .map(|m| m.start())
        .ok_or(PropertiesError::MissingLibsLine)?;

    let end = [
        SECTION_DELIMITER_RE.find_at(text, start).map(|m| m.start()),
        TOOLS_LINE_RE.find_at(text, start).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(text.len());

    let mut out = String::with_capacity(text.len() + new_block.len());
    out.push_str(&text[..start]);
    out.push_str(new_block);
    if !new_block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&text[end..]);
    Ok(out)
}

/// Lines of `text` paired with their terminator.
fn split_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split_inclusive('\n').map(|raw| {
        let line = raw.trim_end_matches(['\n', '\r']);
        (line, &raw[line.len()..])
    })
}

/// Whether any `libs.<id>.` line exists.
pub fn has_library_block(text: &str, id: &str) -> bool {
    let prefix = format!("libs.{}.", id);
    text.lines().any(|l| l.starts_with(&prefix))
}

/// Add a version to a library that already has a block.
///
/// Extends `libs.<id>.versions=` (creating it when the block has none) and
/// appends the `libs.<id>.versions.<key>.version=` line after the library's
/// last line.
pub fn add_version_to_library(text: &str, id: &str, version: &str) -> (String, MergeOutcome) {
    let eol = line_ending(text);
    let key = version_key(version);
    let versions_prefix = format!("libs.{}.versions=", id);
    let lib_prefix = format!("libs.{}.", id);

    let current = split_lines(text).find_map(|(line, _)| line.strip_prefix(versions_prefix.as_str()));
    if current.is_some_and(|current| list_contains(current, &key)) {
        return (text.to_string(), MergeOutcome::Unchanged);
    }
    let has_versions_line = current.is_some();

    let mut out = String::with_capacity(text.len() + 64);
    let mut insert_at = None;
    for (line, terminator) in split_lines(text) {
        match line.strip_prefix(versions_prefix.as_str()) {
            Some(current) => {
                let current = current.trim_end();
                out.push_str(&versions_prefix);
                if !current.is_empty() {
                    out.push_str(current);
                    out.push(':');
                }
                out.push_str(&key);
            }
            None => out.push_str(line),
        }
        if line.starts_with(&lib_prefix) {
            insert_at = Some(out.len());
        }
        out.push_str(terminator);
    }

    let mut new_lines = Vec::with_capacity(2);
    if !has_versions_line {
        new_lines.push(format!("{}{}", versions_prefix, key));
    }
    new_lines.push(format!("libs.{}.versions.{}.version={}", id, key, version));

    match insert_at {
        Some(pos) => {
            let mut insertion = String::new();
            for line in &new_lines {
                insertion.push_str(eol);
                insertion.push_str(line);
            }
            out.insert_str(pos, &insertion);
        }
        None => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push_str(eol);
            }
            for line in &new_lines {
                out.push_str(line);
                out.push_str(eol);
            }
        }
    }

    (out, MergeOutcome::VersionAdded)
}

/// Merge one version of a library into a properties file.
///
/// A library without a block gets its identifier listed and `block`
/// inserted before the installed-tools section; a library that already has
/// one only gains the version.
pub fn merge_library_block(
    text: &str,
    id: &str,
    version: &str,
    block: &[String],
) -> (String, MergeOutcome) {
    let text = add_identifier_to_list_line(text, id);
    if has_library_block(&text, id) {
        return add_version_to_library(&text, id, version);
    }

    (
        insert_block_before_section(&text, block, &INSTALLED_TOOLS_MARKER),
        MergeOutcome::Added,
    )
}

/// Properties block for a Fortran library.
pub fn fortran_block(id: &str, url: &str, version: &str) -> Vec<String> {
    let key = version_key(version);
    vec![
        format!("libs.{}.name={}", id, id),
        format!("libs.{}.url={}", id, url),
        format!("libs.{}.staticliblink={}", id, id),
        format!("libs.{}.versions={}", id, key),
        format!("libs.{}.packagedheaders=true", id),
        format!("libs.{}.versions.{}.version={}", id, key, version),
    ]
}

/// Properties block for a Go module.
pub fn go_block(id: &str, module: &str, version: &str) -> Vec<String> {
    let key = version_key(version);
    let mut lines = vec![format!("libs.{}.name={}", id, module_display_name(module))];
    if let Some(url) = module_to_github_url(module) {
        lines.push(format!("libs.{}.url={}", id, url));
    }
    lines.push(format!("libs.{}.lookupname=go_{}", id, id));
    lines.push(format!("libs.{}.packagedheaders=true", id));
    lines.push(format!("libs.{}.versions={}", id, key));
    lines.push(format!("libs.{}.versions.{}.version={}", id, key, version));
    lines
}
