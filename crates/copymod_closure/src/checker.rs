use anyhow::{Context, Result};
use copymod_core::{ModuleIndex, ResolveCache};
use log::{debug, info, warn};

use crate::{config::Config, graph::build_closure, reporter::render, types::CopyResult};

/// Resolves the entry and project root, then collects and renders the closure.
pub fn run_copy(mut cfg: Config) -> Result<CopyResult> {
    info!("Starting module copy for '{}'", cfg.target);
    cfg.initialize()?;
    copy_initialized(&cfg)
}

pub(crate) fn copy_initialized(cfg: &Config) -> Result<CopyResult> {
    let root = cfg.root()?.clone();
    let entry = cfg.entry()?.clone();

    let search_roots = cfg.module_search_roots()?;
    debug!("Module search roots: {:?}", search_roots);
    let index = ModuleIndex::build(&search_roots).context("Failed to index project modules")?;
    if index.is_empty() {
        warn!("No importable modules found under {}", root.display());
    } else {
        info!("Indexed {} modules", index.len());
    }

    let resolve_cache = ResolveCache::new();
    let closure = build_closure(&root, &index, &entry, &resolve_cache);

    let rendered = render(&closure, &root, cfg.format)?;
    info!("Rendered {} files ({} skipped)", rendered.files.len(), rendered.skipped.len());

    Ok(CopyResult { root, entry, closure, rendered })
}
