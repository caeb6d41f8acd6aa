//! Repository root detection
//!
//! Commands work from anywhere inside the repository, the way git does:
//! the root is the nearest ancestor holding `sysset.toml` or `.git`.

use std::path::{Path, PathBuf};

use sysset_fs::RepoPath;

/// Walk up from `cwd` to the first directory that looks like a sysset
/// repository.
pub fn detect_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| {
            dir.join(RepoPath::RepoConfig.as_str()).is_file()
                || dir.join(RepoPath::GitDir.as_str()).exists()
        })
        .map(Path::to_path_buf)
}
