//! Core utilities for copymod.
//!
//! This crate provides the building blocks for computing which files of a
//! Python project a given module pulls in, including:
//! - Locating the project root from a starting directory
//! - Parsing import statements from Python files
//! - Indexing the dotted module names available under a set of search roots
//! - Resolving import declarations to files inside the project

mod collector;
mod config;
mod constants;
mod parser;
mod resolver;
mod types;

// Re-export public API
pub use collector::ModuleIndex;
pub use config::find_project_root;
pub use constants::{PACKAGE_INIT, PYTHON_EXTENSIONS, ROOT_MARKERS, SKIPPED_DIRS};
pub use parser::{imports_for, parse_imports};
pub use resolver::{ResolveCache, is_inside, module_file_in, normalize, resolve};
pub use types::{ImportDeclaration, ResolvedTarget};
