use dashmap::DashMap;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::{
    collector::ModuleIndex,
    constants::{PACKAGE_INIT, PYTHON_EXTENSIONS},
    types::{ImportDeclaration, ResolvedTarget},
};

/// Per-run memo of resolutions, keyed by the directory a relative import is
/// anchored at (the project root for absolute imports) and the declaration.
pub type ResolveCache = DashMap<(PathBuf, ImportDeclaration), ResolvedTarget>;

/// True when `path` lies strictly below `root`.
pub fn is_inside(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}

/// Resolves one declaration found in `from_file` to a file inside `root`.
///
/// Never fails: anything that cannot be mapped to an indexed file under the
/// project root is [`ResolvedTarget::External`].
pub fn resolve(
    root: &Path,
    index: &ModuleIndex,
    from_file: &Path,
    decl: &ImportDeclaration,
    cache: &ResolveCache,
) -> ResolvedTarget {
    let anchor = match decl {
        ImportDeclaration::Relative { .. } => from_file.parent().unwrap_or(root),
        ImportDeclaration::Absolute(_) => root,
    };
    let key = (anchor.to_path_buf(), decl.clone());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", decl, from_file.display());
        return v.clone();
    }
    trace!("Resolving: '{}' from {}", decl, from_file.display());

    let resolved = match normalize(decl, from_file, root) {
        None => {
            debug!(
                "Import '{}' in {} cannot be expressed inside the project root",
                decl,
                from_file.display()
            );
            ResolvedTarget::External
        }
        Some(dotted) => {
            trace!("Normalized '{}' to '{}'", decl, dotted);
            match index.lookup(&dotted) {
                Some(path) if is_inside(path, root) => {
                    debug!("Module {} resolved to {}", dotted, path.display());
                    ResolvedTarget::Internal(path.to_path_buf())
                }
                Some(path) => {
                    debug!("Module {} is external: {}", dotted, path.display());
                    ResolvedTarget::External
                }
                None => {
                    trace!("Module {} not found in any search root", dotted);
                    ResolvedTarget::External
                }
            }
        }
    };

    cache.insert(key, resolved.clone());
    resolved
}

/// Rewrites a declaration as an absolute dotted module name.
///
/// Relative declarations are anchored at the directory holding `from_file`
/// (one dot), each further dot climbing one directory. Returns `None` when the
/// climb leaves `root` or the name would be empty.
pub fn normalize(decl: &ImportDeclaration, from_file: &Path, root: &Path) -> Option<String> {
    let (level, module) = match decl {
        ImportDeclaration::Absolute(module) => {
            return if module.is_empty() { None } else { Some(module.clone()) };
        }
        ImportDeclaration::Relative { level, module } => (*level, module),
    };

    let mut base = from_file.parent()?;
    for _ in 1..level {
        base = base.parent()?;
    }
    trace!("Relative import anchored at: {}", base.display());

    let rel_base = base.strip_prefix(root).ok()?;
    let mut segments = rel_base
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    segments.extend(module.split('.').filter(|s| !s.is_empty()));

    if segments.is_empty() { None } else { Some(segments.join(".")) }
}

/// Looks for the file backing `dotted` directly under `dir`: the package
/// `__init__.py` first, then a module file.
pub fn module_file_in(dir: &Path, dotted: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = dotted.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let base = segments.iter().fold(dir.to_path_buf(), |acc, segment| acc.join(segment));

    let init = base.join(PACKAGE_INIT);
    if init.is_file() {
        return Some(init.canonicalize().unwrap_or(init));
    }

    for ext in PYTHON_EXTENSIONS {
        let candidate = base.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn rel(level: usize, module: &str) -> ImportDeclaration {
        ImportDeclaration::Relative { level, module: module.to_string() }
    }

    fn abs(module: &str) -> ImportDeclaration {
        ImportDeclaration::Absolute(module.to_string())
    }

    #[test]
    fn test_normalize_absolute() {
        let root = Path::new("/project");
        let file = Path::new("/project/pkg/a.py");
        assert_eq!(normalize(&abs("pkg.b"), file, root), Some("pkg.b".to_string()));
    }

    #[test]
    fn test_normalize_relative_same_package() {
        let root = Path::new("/project");
        let file = Path::new("/project/pkg/a.py");
        assert_eq!(normalize(&rel(1, ""), file, root), Some("pkg".to_string()));
        assert_eq!(normalize(&rel(1, "b"), file, root), Some("pkg.b".to_string()));
    }

    #[test]
    fn test_normalize_relative_parent_package() {
        let root = Path::new("/project");
        let file = Path::new("/project/app/api/views.py");
        assert_eq!(
            normalize(&rel(2, "core.models"), file, root),
            Some("app.core.models".to_string())
        );
    }

    #[test]
    fn test_normalize_relative_at_root() {
        let root = Path::new("/project");
        let file = Path::new("/project/main.py");
        assert_eq!(normalize(&rel(1, "helper"), file, root), Some("helper".to_string()));
        // The root directory itself is not a module
        assert_eq!(normalize(&rel(1, ""), file, root), None);
    }

    #[test]
    fn test_normalize_relative_overflow() {
        let root = Path::new("/project");
        let file = Path::new("/project/pkg/a.py");
        assert_eq!(normalize(&rel(3, "x"), file, root), None);
        assert_eq!(normalize(&rel(50, "x"), file, root), None);
    }

    #[test]
    fn test_resolve_relative_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        create_test_file(&root, "pkg/__init__.py", "");
        let a = create_test_file(&root, "pkg/a.py", "from . import b\n");
        let b = create_test_file(&root, "pkg/b.py", "");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        let resolved = resolve(&root, &index, &a, &rel(1, "b"), &cache);
        assert_eq!(resolved, ResolvedTarget::Internal(b));

        let package = resolve(&root, &index, &a, &rel(1, ""), &cache);
        assert_eq!(package, ResolvedTarget::Internal(root.join("pkg/__init__.py")));
    }

    #[test]
    fn test_resolve_absolute_internal() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let main = create_test_file(&root, "main.py", "import app.service\n");
        let service = create_test_file(&root, "app/service.py", "");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        let resolved = resolve(&root, &index, &main, &abs("app.service"), &cache);
        assert_eq!(resolved, ResolvedTarget::Internal(service));
    }

    #[test]
    fn test_resolve_unknown_module_is_external() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let main = create_test_file(&root, "main.py", "import os\n");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root, &index, &main, &abs("os"), &cache), ResolvedTarget::External);
        assert_eq!(
            resolve(&root, &index, &main, &abs("requests.adapters"), &cache),
            ResolvedTarget::External
        );
    }

    #[test]
    fn test_resolve_outside_root_is_external() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().canonicalize().unwrap();
        let root = base.join("project");
        let vendor = base.join("vendor");
        let main = create_test_file(&root, "main.py", "import thirdparty\n");
        create_test_file(&vendor, "thirdparty.py", "");

        let index = ModuleIndex::build(&[root.clone(), vendor]).unwrap();
        assert!(index.lookup("thirdparty").is_some());

        let cache = ResolveCache::new();
        let resolved = resolve(&root, &index, &main, &abs("thirdparty"), &cache);
        assert_eq!(resolved, ResolvedTarget::External);
    }

    #[test]
    fn test_resolve_relative_overflow_is_external() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let a = create_test_file(&root, "pkg/a.py", "from ...outside import x\n");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        let resolved = resolve(&root, &index, &a, &rel(3, "outside"), &cache);
        assert_eq!(resolved, ResolvedTarget::External);
    }

    #[test]
    fn test_resolve_namespace_directory_is_external() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let main = create_test_file(&root, "main.py", "import plugins\n");
        create_test_file(&root, "plugins/loader.py", "");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        assert_eq!(
            resolve(&root, &index, &main, &abs("plugins"), &cache),
            ResolvedTarget::External
        );
        assert!(resolve(&root, &index, &main, &abs("plugins.loader"), &cache)
            .internal_path()
            .is_some());
    }

    #[test]
    fn test_resolve_cache() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let a = create_test_file(&root, "pkg/a.py", "");
        let c = create_test_file(&root, "pkg/c.py", "");
        let b = create_test_file(&root, "pkg/b.py", "");

        let index = ModuleIndex::build(&[root.clone()]).unwrap();
        let cache = ResolveCache::new();

        let first = resolve(&root, &index, &a, &rel(1, "b"), &cache);
        // Same package, same declaration: answered from the cache
        let second = resolve(&root, &index, &c, &rel(1, "b"), &cache);
        assert_eq!(first, ResolvedTarget::Internal(b));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_module_file_in() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let module = create_test_file(&root, "app/cli.py", "");
        let package = create_test_file(&root, "app/__init__.py", "");

        assert_eq!(module_file_in(&root, "app.cli"), Some(module));
        assert_eq!(module_file_in(&root, "app"), Some(package));
        assert_eq!(module_file_in(&root, "app.missing"), None);
        assert_eq!(module_file_in(&root, "app..cli"), None);
        assert_eq!(module_file_in(&root, ""), None);
    }

    #[test]
    fn test_is_inside() {
        let root = Path::new("/project");
        assert!(is_inside(Path::new("/project/a.py"), root));
        assert!(is_inside(Path::new("/project/pkg/a.py"), root));
        assert!(!is_inside(Path::new("/project"), root));
        assert!(!is_inside(Path::new("/projects/a.py"), root));
        assert!(!is_inside(Path::new("/usr/lib/python3/os.py"), root));
    }
}
