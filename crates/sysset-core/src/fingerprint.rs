//! Lazily resolved per-file fingerprints
//!
//! A [`FileFingerprint`] starts with nothing known about its file. The
//! modification time and the content digest are each resolved at most once
//! through a [`FileProbe`]; a failure is cached the same way a value is, so
//! a file that could not be read is never retried within one run.

use std::fmt;
use std::fs;
use std::io;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use sysset_fs::{NormalizedPath, checksum};

use crate::lockfile::LockedFingerprint;

/// Which resolution step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintErrorKind {
    /// The file could not be stat'd
    StatFailed,
    /// The file could not be read (or the read timed out)
    ReadFailed,
}

impl fmt::Display for FingerprintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatFailed => f.write_str("stat failed"),
            Self::ReadFailed => f.write_str("read failed"),
        }
    }
}

/// A per-file resolution failure.
///
/// Recovered as the owning pair's `error` verdict during reconciliation,
/// fatal during locking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} for {path}: {message}")]
pub struct FingerprintError {
    pub kind: FingerprintErrorKind,
    pub path: NormalizedPath,
    pub message: String,
}

impl FingerprintError {
    pub fn new(kind: FingerprintErrorKind, path: &NormalizedPath, source: &io::Error) -> Self {
        let message = match source.kind() {
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            io::ErrorKind::NotFound => "no such file".to_string(),
            _ => source.to_string(),
        };
        Self {
            kind,
            path: path.clone(),
            message,
        }
    }
}

/// Three-state result of a lazy lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Unresolved,
    Resolved(T),
    Failed(FingerprintError),
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Self::Unresolved
    }
}

impl<T> Resolution<T> {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FingerprintError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Run `resolve` if nothing is known yet, then report the settled state.
    fn settle(
        &mut self,
        resolve: impl FnOnce() -> Result<T, FingerprintError>,
    ) -> Result<T, FingerprintError>
    where
        T: Clone,
    {
        match self {
            Self::Resolved(value) => Ok(value.clone()),
            Self::Failed(err) => Err(err.clone()),
            Self::Unresolved => {
                let outcome = resolve();
                *self = match &outcome {
                    Ok(value) => Self::Resolved(value.clone()),
                    Err(err) => Self::Failed(err.clone()),
                };
                outcome
            }
        }
    }
}

/// Filesystem access used by fingerprint resolution.
///
/// Production code uses [`LocalProbe`]; tests substitute doubles that count
/// digest calls or inject failures.
pub trait FileProbe: Send + Sync {
    /// Modification time in fractional seconds since the Unix epoch.
    fn modified(&self, path: &NormalizedPath) -> io::Result<f64>;

    /// Lowercase hex SHA-256 of the file's content.
    fn digest(&self, path: &NormalizedPath) -> io::Result<String>;

    fn exists(&self, path: &NormalizedPath) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &NormalizedPath) -> bool {
        path.is_file()
    }
}

impl<P: FileProbe + ?Sized> FileProbe for &P {
    fn modified(&self, path: &NormalizedPath) -> io::Result<f64> {
        (**self).modified(path)
    }

    fn digest(&self, path: &NormalizedPath) -> io::Result<String> {
        (**self).digest(path)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        (**self).exists(path)
    }

    fn is_file(&self, path: &NormalizedPath) -> bool {
        (**self).is_file(path)
    }
}

/// Probe backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalProbe {
    read_timeout: Option<Duration>,
}

impl LocalProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every digest read by `timeout`.
    pub fn with_read_timeout(timeout: Duration) -> Self {
        Self {
            read_timeout: Some(timeout),
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl FileProbe for LocalProbe {
    fn modified(&self, path: &NormalizedPath) -> io::Result<f64> {
        let modified = fs::metadata(path.to_native())?.modified()?;
        Ok(epoch_seconds(modified))
    }

    fn digest(&self, path: &NormalizedPath) -> io::Result<String> {
        checksum::compute_file_digest_with_timeout(&path.to_native(), self.read_timeout)
    }
}

/// Seconds since the epoch; negative for times before it.
pub fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

/// What is known about one file during a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFingerprint {
    path: NormalizedPath,
    mtime: Resolution<f64>,
    content_hash: Resolution<String>,
    revision_id: Option<String>,
}

impl FileFingerprint {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            mtime: Resolution::Unresolved,
            content_hash: Resolution::Unresolved,
            revision_id: None,
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn mtime(&self) -> &Resolution<f64> {
        &self.mtime
    }

    pub fn content_hash(&self) -> &Resolution<String> {
        &self.content_hash
    }

    pub fn revision_id(&self) -> Option<&str> {
        self.revision_id.as_deref()
    }

    pub fn set_revision_id(&mut self, revision_id: Option<String>) {
        self.revision_id = revision_id;
    }

    /// Stat the file unless its mtime is already settled.
    pub fn resolve_mtime<P: FileProbe + ?Sized>(&mut self, probe: &P) -> Result<f64, FingerprintError> {
        let path = &self.path;
        self.mtime
            .settle(|| {
                probe
                    .modified(path)
                    .map_err(|e| FingerprintError::new(FingerprintErrorKind::StatFailed, path, &e))
            })
    }

    /// Digest the file unless its hash is already settled.
    pub fn resolve_hash<P: FileProbe + ?Sized>(&mut self, probe: &P) -> Result<String, FingerprintError> {
        let path = &self.path;
        self.content_hash
            .settle(|| {
                tracing::trace!(path = %path, "hashing");
                probe
                    .digest(path)
                    .map_err(|e| FingerprintError::new(FingerprintErrorKind::ReadFailed, path, &e))
            })
    }

    /// Forget everything resolved so far.
    pub fn reset(&mut self) {
        self.mtime = Resolution::Unresolved;
        self.content_hash = Resolution::Unresolved;
        self.revision_id = None;
    }

    /// Persisted form; unresolved or failed fields become sentinels.
    pub fn to_locked(&self) -> LockedFingerprint {
        LockedFingerprint {
            mtime: self.mtime.value().copied().unwrap_or(0.0),
            content_hash: self.content_hash.value().cloned().unwrap_or_default(),
            revision_id: self.revision_id.clone().unwrap_or_default(),
        }
    }
}
