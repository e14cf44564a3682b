//! Package directory discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::Result;

/// Returns every directory under `root` containing at least one buildable Go
/// source file, in sorted order so enumeration is deterministic per run.
pub fn package_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = BTreeSet::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .ignore(true)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_go_source(path) {
            if let Some(parent) = path.parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
    }

    Ok(dirs.into_iter().collect())
}

/// A buildable Go source file. Test files never contribute documentation.
pub fn is_go_source(path: &Path) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.ends_with(".go") && !name.ends_with("_test.go"),
        None => false,
    }
}

/// Go source files of one directory, sorted so aggregation across files is
/// deterministic.
pub fn go_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_go_source(path))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_is_go_source() {
        assert!(is_go_source(Path::new("main.go")));
        assert!(is_go_source(Path::new("internal/api/model.go")));
        assert!(!is_go_source(Path::new("model_test.go")));
        assert!(!is_go_source(Path::new("README.md")));
        assert!(!is_go_source(Path::new("go.mod")));
    }

    #[test]
    fn test_package_dirs_finds_nested_packages() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "main.go", "package main");
        create_file(dir.path(), "internal/api/model.go", "package api");
        create_file(dir.path(), "internal/api/extra.go", "package api");
        create_file(dir.path(), "docs/notes.md", "# notes");

        let dirs = package_dirs(dir.path()).unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs.iter().any(|d| d.ends_with("api")));
    }

    #[test]
    fn test_package_dirs_sorted() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "zeta/z.go", "package zeta");
        create_file(dir.path(), "alpha/a.go", "package alpha");

        let dirs = package_dirs(dir.path()).unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].ends_with("alpha"));
        assert!(dirs[1].ends_with("zeta"));
    }

    #[test]
    fn test_package_dirs_skips_hidden_directories() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "visible/v.go", "package visible");
        create_file(dir.path(), ".git/objects/fake.go", "package fake");

        let dirs = package_dirs(dir.path()).unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("visible"));
    }

    #[test]
    fn test_package_dirs_ignores_test_only_directories() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "pkg/pkg_test.go", "package pkg");

        let dirs = package_dirs(dir.path()).unwrap();
        assert!(dirs.is_empty());
    }

    #[test]
    fn test_go_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "b.go", "package p");
        create_file(dir.path(), "a.go", "package p");
        create_file(dir.path(), "a_test.go", "package p");
        create_file(dir.path(), "notes.txt", "notes");

        let files = go_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.go"));
        assert!(files[1].ends_with("b.go"));
    }

    #[test]
    fn test_go_files_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(go_files(dir.path()).unwrap().is_empty());
    }
}
