//! Discovery of virtual files inside the repository

use std::path::Path;

use sysset_fs::{NormalizedPath, RepoPath};
use walkdir::{DirEntry, WalkDir};

use crate::mapping::Platform;
use crate::{Error, Result};

/// Every deployable file under `root`, in sorted order.
///
/// Files directly in the root (README, config) are not deployable, and the
/// `.git` and `.sysset` directories are never entered. On darwin only the
/// `@darwin/` and `home/` trees apply; elsewhere `@darwin/` is skipped.
/// Symlinks are never followed; one is listed only when it resolves to a
/// regular file.
pub fn enumerate_virtual_files(root: &Path, platform: Platform) -> Result<Vec<NormalizedPath>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, platform));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Traversal {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.depth() < 2 || !entry.path().is_file() {
            continue;
        }
        files.push(NormalizedPath::new(entry.path()));
    }

    tracing::debug!(root = %root.display(), %platform, files = files.len(), "enumerated virtual files");
    Ok(files)
}

/// Prune whole top-level subtrees; deeper entries inherit the decision.
fn keep_entry(entry: &DirEntry, platform: Platform) -> bool {
    if entry.depth() != 1 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name == RepoPath::GitDir.as_str() || name == RepoPath::StateDir.as_str() {
        return false;
    }
    match platform {
        Platform::Darwin => {
            name == RepoPath::DarwinOverlay.as_str() || name == RepoPath::HomeOverlay.as_str()
        }
        Platform::Linux => name != RepoPath::DarwinOverlay.as_str(),
    }
}
