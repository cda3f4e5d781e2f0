use copymod_core::{ModuleIndex, ResolveCache, imports_for, is_inside, resolve};
use log::{debug, info, trace};
use std::{
    collections::{BTreeSet, VecDeque},
    path::{Path, PathBuf},
};

/// Order in which the worklist is drained. The resulting closure is the same
/// either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    #[default]
    DepthFirst,
    BreadthFirst,
}

/// Every project file reachable from `seed` through resolvable imports,
/// `seed` included.
pub fn build_closure(
    root: &Path,
    index: &ModuleIndex,
    seed: &Path,
    resolve_cache: &ResolveCache,
) -> BTreeSet<PathBuf> {
    build_closure_with(root, index, seed, resolve_cache, Traversal::default())
}

pub fn build_closure_with(
    root: &Path,
    index: &ModuleIndex,
    seed: &Path,
    resolve_cache: &ResolveCache,
    traversal: Traversal,
) -> BTreeSet<PathBuf> {
    info!("Starting dependency collection from: {}", seed.display());
    let mut visited: BTreeSet<PathBuf> = BTreeSet::new();
    let mut worklist: VecDeque<PathBuf> = VecDeque::from([seed.to_path_buf()]);

    loop {
        let next = match traversal {
            Traversal::DepthFirst => worklist.pop_back(),
            Traversal::BreadthFirst => worklist.pop_front(),
        };
        let Some(cur) = next else {
            break;
        };
        if visited.contains(&cur) {
            trace!("Already processed: {}", cur.display());
            continue;
        }
        visited.insert(cur.clone());

        let rel_cur = cur.strip_prefix(root).unwrap_or(&cur);
        info!("Analyzing {}", rel_cur.display());

        let imports = imports_for(&cur);
        trace!("Module has {} import declarations", imports.len());

        for decl in &imports {
            let target = resolve(root, index, &cur, decl, resolve_cache);
            match target.internal_path() {
                Some(path) if path.exists() && is_inside(path, root) => {
                    if !visited.contains(path) {
                        trace!("Adding to worklist: {}", path.display());
                        worklist.push_back(path.clone());
                    }
                }
                _ => {
                    trace!(
                        "Import '{}' in {} is external or does not exist within the project",
                        decl,
                        rel_cur.display()
                    );
                }
            }
        }
    }

    debug!("Resolution cache holds {} entries", resolve_cache.len());
    info!("Dependency collection complete. Total files collected: {}", visited.len());
    visited
}
