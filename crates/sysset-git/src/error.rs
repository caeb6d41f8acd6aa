//! Error types for sysset-git

use std::path::PathBuf;

/// Result type for sysset-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sysset-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] sysset_fs::Error),

    #[error("Repository at {path} has no working directory")]
    BareRepository { path: PathBuf },

    #[error("Not inside a git repository: {path}")]
    NotARepository { path: PathBuf },
}
