//! Go module discovery: the enclosing project root and its declared identity.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExtractError, Result};

/// Walks up from `dir` to the nearest directory containing a `go.mod`.
pub fn find_module_root(dir: &Path) -> Result<PathBuf> {
    let start = dir.canonicalize()?;
    let mut current = start.as_path();
    loop {
        if current.join("go.mod").is_file() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Err(ExtractError::ModuleRootNotFound(start.display().to_string())),
        }
    }
}

/// Reads the `module` directive from the root's `go.mod`.
pub fn module_path(root: &Path) -> Result<String> {
    let file = root.join("go.mod");
    let content = fs::read_to_string(&file)?;

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("");
        let mut parts = line.split_whitespace();
        if parts.next() == Some("module") {
            if let Some(path) = parts.next() {
                return Ok(path.trim_matches('"').to_string());
            }
        }
    }

    Err(ExtractError::ModulePath(file.display().to_string()))
}

/// Import path for a package directory: the module identity plus the
/// directory's path relative to the module root, `/`-separated. The root
/// package maps to the bare identity.
pub fn import_path(module_name: &str, root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    if rel.as_os_str().is_empty() {
        return module_name.to_string();
    }
    let rel = rel.to_string_lossy().replace('\\', "/");
    format!("{module_name}/{rel}")
}
