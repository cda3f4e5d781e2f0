use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use copymod_core::{PYTHON_EXTENSIONS, find_project_root, is_inside, module_file_in};
use log::{debug, info};
use path_clean::clean;
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::types::Format;

#[derive(Debug, Clone, Parser)]
#[command(name = "copymod")]
#[command(about = "Copy all imported project files recursively to the clipboard")]
pub struct Config {
    /// Module name or path to the Python file
    pub target: String,

    /// Root directory of the project (defaults to the nearest directory with a project marker)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Extra directory to search for modules after the project root (repeatable)
    #[arg(long = "search-root", value_name = "DIR")]
    pub search_roots: Vec<PathBuf>,

    /// Print the result to stdout instead of copying it to the clipboard
    #[arg(long)]
    pub stdout: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    #[clap(skip)]
    pub entry: Option<PathBuf>,
}

impl Config {
    /// Initialize the config by resolving the entry file and the project root
    pub fn initialize(&mut self) -> Result<()> {
        let cwd = env::current_dir().context("Failed to read the current directory")?;
        self.initialize_from(&cwd)
    }

    /// Same as [`Config::initialize`], with relative paths taken from `cwd`
    pub fn initialize_from(&mut self, cwd: &Path) -> Result<()> {
        self.search_roots = self.search_roots.iter().map(|r| absolutize(cwd, r)).collect();

        let entry = locate_entry(&self.target, cwd, &self.search_roots)?;
        debug!("Entry resolved to: {}", entry.display());

        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            let r = absolutize(cwd, &r);
            r.canonicalize().with_context(|| format!("Invalid root directory {}", r.display()))?
        } else {
            debug!("No root provided, searching for project markers");
            find_project_root(entry.parent().unwrap_or(cwd))?
        };
        info!("Using root directory: {}", root.display());

        if !is_inside(&entry, &root) {
            bail!("Entry {} is outside the project root {}", entry.display(), root.display());
        }

        self.root = Some(root);
        self.entry = Some(entry);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    /// Get the entry file, returning an error if not initialized
    pub fn entry(&self) -> Result<&PathBuf> {
        self.entry
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    /// The project root followed by the extra search roots
    pub fn module_search_roots(&self) -> Result<Vec<PathBuf>> {
        let mut roots = vec![self.root()?.clone()];
        roots.extend(self.search_roots.iter().cloned());
        Ok(roots)
    }
}

/// Maps the target argument to an existing file: a `.py` path, or a dotted
/// module name looked up in `cwd` and then each search root.
fn locate_entry(target: &str, cwd: &Path, search_roots: &[PathBuf]) -> Result<PathBuf> {
    let is_source_path = Path::new(target)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext));

    if is_source_path {
        let path = absolutize(cwd, Path::new(target));
        if !path.is_file() {
            bail!("Entry file not found: {}", target);
        }
        debug!("Input is a Python file: {}", path.display());
        return path.canonicalize().with_context(|| format!("Failed to resolve {}", target));
    }

    debug!("Attempting to locate module: {}", target);
    let dirs = std::iter::once(cwd).chain(search_roots.iter().map(PathBuf::as_path));
    for dir in dirs {
        if let Some(file) = module_file_in(dir, target) {
            debug!("Module {} resolved to file: {}", target, file.display());
            return Ok(file);
        }
    }

    bail!("Module not found: {}", target)
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { clean(path) } else { clean(cwd.join(path)) }
}
