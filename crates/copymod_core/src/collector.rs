use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace, warn};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::constants::{PACKAGE_INIT, PYTHON_EXTENSIONS, SKIPPED_DIRS};

#[derive(Debug, Clone)]
struct ModuleEntry {
    path: PathBuf,
    is_package: bool,
}

#[derive(Debug, Clone)]
struct SearchRoot {
    path: PathBuf,
    modules: HashMap<String, ModuleEntry>,
}

/// Maps dotted module names to the files backing them, per search root.
///
/// Built once per run by walking each search root, so resolving an import is a
/// lookup rather than a probe of the live filesystem.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    roots: Vec<SearchRoot>,
}

impl ModuleIndex {
    /// Walks every search root in order. Roots that do not exist are skipped.
    pub fn build(search_roots: &[PathBuf]) -> Result<Self> {
        let mut roots = Vec::with_capacity(search_roots.len());

        for root in search_roots {
            let path = match root.canonicalize() {
                Ok(p) => p,
                Err(e) => {
                    warn!("Skipping search root {}: {}", root.display(), e);
                    continue;
                }
            };
            if roots.iter().any(|r: &SearchRoot| r.path == path) {
                trace!("Search root already indexed: {}", path.display());
                continue;
            }

            let modules = index_root(&path)?;
            debug!("Indexed {} modules under {}", modules.len(), path.display());
            roots.push(SearchRoot { path, modules });
        }

        Ok(Self { roots })
    }

    /// Returns the file for `dotted`, searching roots in order.
    pub fn lookup(&self, dotted: &str) -> Option<&Path> {
        self.roots.iter().find_map(|root| {
            root.modules.get(dotted).map(|entry| {
                trace!("Module '{}' found under {}", dotted, root.path.display());
                entry.path.as_path()
            })
        })
    }

    pub fn search_roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|r| r.path.as_path())
    }

    /// Total number of indexed modules across all search roots
    pub fn len(&self) -> usize {
        self.roots.iter().map(|r| r.modules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index_root(root: &Path) -> Result<HashMap<String, ModuleEntry>> {
    trace!("Walking directory tree from search root: {}", root.display());
    let mut modules: HashMap<String, ModuleEntry> = HashMap::new();

    // Ignore files do not hide modules from the interpreter, only dotfiles are
    // unreachable by dotted names
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(|dent| {
            let skipped = dent.file_type().is_some_and(|ft| ft.is_dir())
                && dent.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name));
            !skipped
        })
        .build();

    for res in walker {
        let dent = match res {
            Ok(dent) => dent,
            Err(e) => {
                warn!("Error while indexing {}: {}", root.display(), e);
                continue;
            }
        };
        let Some(ft) = dent.file_type() else {
            continue;
        };
        let p = dent.path();
        let Ok(rel_path) = p.strip_prefix(root) else {
            continue;
        };
        let Some((dotted, is_package)) = dotted_name_for(rel_path) else {
            continue;
        };

        // The module is named after the link, but backed by its target
        let file = if ft.is_symlink() {
            match p.canonicalize() {
                Ok(target) if target.is_file() => {
                    trace!("Symlinked module {} -> {}", p.display(), target.display());
                    target
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!("Dangling module link {}: {}", p.display(), e);
                    continue;
                }
            }
        } else if ft.is_file() {
            p.to_path_buf()
        } else {
            continue;
        };

        // A package shadows a same-named module file
        if let Some(existing) = modules.get(&dotted)
            && existing.is_package
            && !is_package
        {
            trace!("Module file {} shadowed by package '{}'", p.display(), dotted);
            continue;
        }

        trace!("Indexed module '{}' -> {}", dotted, file.display());
        modules.insert(dotted, ModuleEntry { path: file, is_package });
    }

    Ok(modules)
}

/// Converts a path relative to a search root into its dotted module name.
///
/// Returns the name and whether the file is a package `__init__`. The search
/// root's own `__init__.py` and non-Python files have no name.
fn dotted_name_for(rel_path: &Path) -> Option<(String, bool)> {
    let ext = rel_path.extension().and_then(|e| e.to_str())?;
    if !PYTHON_EXTENSIONS.contains(&ext) {
        return None;
    }

    let mut segments = rel_path
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;

    let file_name = segments.pop()?;
    let is_package = file_name == PACKAGE_INIT;
    if !is_package {
        let stem = Path::new(file_name).file_stem().and_then(|s| s.to_str())?;
        // Files like `foo.bar.py` cannot be addressed by a dotted import
        if stem.contains('.') {
            return None;
        }
        segments.push(stem);
    }

    if segments.is_empty() {
        return None;
    }
    Some((segments.join("."), is_package))
}
