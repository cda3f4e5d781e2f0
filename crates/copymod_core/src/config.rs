use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use std::path::{Path, PathBuf};

use crate::constants::ROOT_MARKERS;

/// Walks up from `start` to the nearest directory holding one of [`ROOT_MARKERS`].
///
/// When no ancestor holds a marker, the canonical `start` directory is returned so
/// the project boundary never silently widens to the filesystem root.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let start = start
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory {}", start.display()))?;
    debug!("Searching for project root from: {}", start.display());

    let mut current_dir = start.as_path();
    loop {
        trace!("Checking for markers in: {}", current_dir.display());
        for marker in ROOT_MARKERS {
            if current_dir.join(marker).exists() {
                info!("Project root found at: {} (contains {})", current_dir.display(), marker);
                return Ok(current_dir.to_path_buf());
            }
        }

        // Try to move up to parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent,
            None => {
                debug!("Reached the filesystem root without finding project markers");
                break;
            }
        }
    }

    warn!("Project root markers not found. Falling back to: {}", start.display());
    Ok(start)
}
