use std::{fmt, path::PathBuf};

/// One parsed import statement target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportDeclaration {
    /// `import a.b` or `from a.b import c`
    Absolute(String),
    /// `from ..a import b`: `level` leading dots, `module` may be empty (`from . import b`)
    Relative { level: usize, module: String },
}

impl fmt::Display for ImportDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportDeclaration::Absolute(module) => write!(f, "{}", module),
            ImportDeclaration::Relative { level, module } => {
                write!(f, "{}{}", ".".repeat(*level), module)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A file under the project root
    Internal(PathBuf),
    /// Standard library, third party, missing, or outside the project root
    External,
}

impl ResolvedTarget {
    pub fn internal_path(&self) -> Option<&PathBuf> {
        match self {
            ResolvedTarget::Internal(p) => Some(p),
            ResolvedTarget::External => None,
        }
    }
}
