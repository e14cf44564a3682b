//! Go front-end: module discovery, package walking, and CST lowering.

pub mod module;
pub mod parser;
pub mod walker;

use std::path::Path;

use tracing::{debug, info};

use crate::api::Module;
use crate::error::Result;
use crate::mapper;

/// Extracts the documentation model for the Go module enclosing `dir`.
///
/// `only` restricts extraction to the listed import paths; a discovered
/// directory whose import path is not listed is skipped before parsing. The
/// run is a single synchronous pass in sorted directory order, so output is
/// stable across runs over an unchanged tree.
pub fn extract(dir: &Path, only: &[String]) -> Result<Module> {
    let root = module::find_module_root(dir)?;
    let module_name = module::module_path(&root)?;
    info!(module = %module_name, root = %root.display(), "extracting module");

    let dirs = walker::package_dirs(&root)?;
    debug!(count = dirs.len(), "found package directories");

    let mut packages = Vec::new();
    for pkg_dir in dirs {
        let import_path = module::import_path(&module_name, &root, &pkg_dir);
        if !only.is_empty() && !only.iter().any(|path| path == &import_path) {
            debug!(package = %import_path, "skipped by allow-list");
            continue;
        }

        let unit = parser::parse_package_dir(&pkg_dir)?;
        if unit.name.is_empty() {
            continue;
        }
        debug!(package = %import_path, "mapped package");
        packages.push((import_path, pkg_dir, mapper::map_package(&unit)));
    }

    info!(packages = packages.len(), "assembled module");
    Ok(mapper::assembler::assemble(&root, &module_name, packages))
}
