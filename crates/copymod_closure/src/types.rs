use clap::ValueEnum;
use serde::Serialize;
use std::{collections::BTreeSet, path::PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `# <path>` header followed by the file content, per file
    #[default]
    Text,
    /// A JSON document with the project root and every file's content
    Json,
}

/// One collected file, ready for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileBlock {
    /// Path relative to the project root, with forward slashes
    pub path: String,
    pub content: String,
}

/// A collected file that could not be read back when rendering.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Rendered {
    pub output: String,
    /// Relative paths in output order
    pub files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct CopyResult {
    pub root: PathBuf,
    pub entry: PathBuf,
    pub closure: BTreeSet<PathBuf>,
    pub rendered: Rendered,
}
