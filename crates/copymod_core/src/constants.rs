//! Constants for project detection and Python module layout.
//!
//! ## Project markers
//!
//! A directory holding any of [`ROOT_MARKERS`] is treated as the project root.
//! The list covers the common dependency manifests plus the version-control
//! directory.
//!
//! ## Module layout
//!
//! - `a/b.py` is the module `a.b`
//! - `a/b/__init__.py` is the package `a.b`

/// Entries whose presence marks a directory as the project root (checked in order)
pub const ROOT_MARKERS: &[&str] = &[
    "requirements.txt", // pip
    "pyproject.toml",   // PEP 518
    "Pipfile",          // pipenv
    "setup.py",         // setuptools
    "setup.cfg",        // setuptools (declarative)
    ".git",             // repository root
];

/// File extensions for Python source files that can be imported
pub const PYTHON_EXTENSIONS: &[&str] = &["py"];

/// File that turns a directory into a regular package
pub const PACKAGE_INIT: &str = "__init__.py";

/// Directory names never descended into when indexing modules
pub const SKIPPED_DIRS: &[&str] = &["__pycache__", "node_modules", "venv", "site-packages"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_markers_include_manifests_and_vcs() {
        assert!(ROOT_MARKERS.contains(&"requirements.txt"));
        assert!(ROOT_MARKERS.contains(&"pyproject.toml"));
        assert!(ROOT_MARKERS.contains(&"Pipfile"));
        assert!(ROOT_MARKERS.contains(&"setup.py"));
        assert!(ROOT_MARKERS.contains(&".git"));
    }

    #[test]
    fn test_package_init_is_python_file() {
        let ext = PACKAGE_INIT.rsplit('.').next().unwrap();
        assert!(PYTHON_EXTENSIONS.contains(&ext));
    }
}
