//! Module assembly and best-effort readme lookup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::{Module, Package};

/// Extensions accepted for a readme file, matched against the lower-cased
/// file name. The empty entry accepts an extension-less `README`.
const README_EXTENSIONS: &[&str] = &["md", "markdown", "txt", ""];

/// Aggregates the mapped packages under the module identity and attaches the
/// readme of the module root and of every package directory.
pub fn assemble(root: &Path, module_name: &str, packages: Vec<(String, PathBuf, Package)>) -> Module {
    let mut module = Module {
        module: module_name.to_string(),
        readme: try_load_readme(root).unwrap_or_default(),
        ..Module::default()
    };

    for (import_path, dir, mut package) in packages {
        package.readme = try_load_readme(&dir).unwrap_or_default();
        module.packages.insert(import_path, package);
    }

    module
}

/// Returns the first non-empty readme in `dir`, scanning entries in sorted
/// order. A missing, unreadable, or empty file is not an error; the readme is
/// simply absent.
pub fn try_load_readme(dir: &Path) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    for name in names {
        if !is_readme_name(&name) {
            continue;
        }
        match fs::read_to_string(dir.join(&name)) {
            Ok(text) if !text.is_empty() => return Some(text),
            Ok(_) => {}
            Err(err) => {
                debug!(file = %name, error = %err, "skipping unreadable readme");
            }
        }
    }

    None
}

fn is_readme_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    let (stem, ext) = match lower.split_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (lower.as_str(), ""),
    };
    stem == "readme" && README_EXTENSIONS.contains(&ext)
}
