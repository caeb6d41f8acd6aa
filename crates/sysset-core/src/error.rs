//! Error types for sysset-core

use std::path::PathBuf;

use crate::fingerprint::FingerprintError;

/// Result type for sysset-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sysset-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lockfile payload is not a mapping of complete entries
    #[error("Malformed lockfile {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Persisting the lockfile failed; the previous file is untouched
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: sysset_fs::Error,
    },

    /// At least one fingerprint could not be resolved while locking
    #[error("Lock aborted, {} file(s) could not be fingerprinted: {}", .failures.len(), summarize(.failures))]
    LockAborted { failures: Vec<FingerprintError> },

    /// Sync refused to run against an incomplete or stale lockfile
    #[error("Sync blocked: {}", .reasons.join("; "))]
    SyncBlocked { reasons: Vec<String> },

    /// Invalid or incomplete configuration
    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Walking the virtual tree failed
    #[error("Failed to enumerate {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    /// The hashing thread pool could not be built
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from sysset-fs
    #[error(transparent)]
    Fs(#[from] sysset_fs::Error),

    /// Git error from sysset-git
    #[error(transparent)]
    Git(#[from] sysset_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn summarize(failures: &[FingerprintError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
