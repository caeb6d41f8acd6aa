//! Persisted fingerprint cache
//!
//! The lockfile maps every tracked path (virtual and real side alike) to the
//! fingerprint observed at the last `lock`. It is a cache: a missing or
//! stale entry only costs a content hash, never a wrong verdict.
//!
//! On disk it is a JSON object keyed by forward-slash path:
//!
//! ```json
//! {
//!   "/home/alice/.bashrc": {
//!     "mtime": 1717171717.25,
//!     "content_hash": "9f86d0…",
//!     "corresponding_git_hash": "4b825dc…"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sysset_fs::{IGNORE_ALL, NormalizedPath, RepoPath, io};

use crate::{Error, Result};

/// The persisted form of a fingerprint.
///
/// `0` and `""` are the "not known" sentinels; they exist only here, never in
/// the in-memory [`crate::fingerprint::Resolution`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LockedFingerprint {
    pub mtime: f64,
    pub content_hash: String,
    #[serde(rename = "corresponding_git_hash")]
    pub revision_id: String,
}

impl LockedFingerprint {
    /// The fingerprint assumed for a path the lockfile has no entry for.
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Whether the entry can back the mtime fast path.
    ///
    /// A locked mtime of exactly `0` counts as unknown, even if the file
    /// really carries an epoch timestamp.
    pub fn is_complete(&self) -> bool {
        self.mtime != 0.0 && !self.content_hash.is_empty()
    }

    pub fn has_revision(&self) -> bool {
        !self.revision_id.is_empty()
    }
}

/// An entry removed because its path is no longer a regular file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingEntry {
    pub path: NormalizedPath,
    pub locked: LockedFingerprint,
}

/// Which half of a tracked pair a lockfile entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Virtual,
    Real,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Virtual => f.write_str("virtual"),
            Self::Real => f.write_str("real"),
        }
    }
}

/// A path the caller expects the lockfile to cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedEntry {
    pub path: NormalizedPath,
    pub side: Side,
    /// Treat an empty revision id as unresolved
    pub requires_revision: bool,
}

/// One finding from [`Lockfile::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyIssue {
    pub path: NormalizedPath,
    /// `None` for dangling entries nobody expects any more
    pub side: Option<Side>,
    pub message: String,
}

/// Result of [`Lockfile::verify`]; the three sets never share a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub dangling: Vec<VerifyIssue>,
    pub missing: Vec<VerifyIssue>,
    pub unresolved: Vec<VerifyIssue>,
}

impl Verification {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.missing.is_empty() && self.unresolved.is_empty()
    }

    pub fn total(&self) -> usize {
        self.dangling.len() + self.missing.len() + self.unresolved.len()
    }

    /// All issues, for callers that filter by side.
    pub fn iter(&self) -> impl Iterator<Item = &VerifyIssue> {
        self.dangling
            .iter()
            .chain(self.missing.iter())
            .chain(self.unresolved.iter())
    }
}

/// In-memory lockfile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lockfile {
    entries: BTreeMap<NormalizedPath, LockedFingerprint>,
    /// Pruned entries not yet reported by `verify`
    removed: Vec<DanglingEntry>,
}

impl Lockfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a lockfile payload without touching the filesystem.
    ///
    /// `origin` only labels errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let entries: BTreeMap<NormalizedPath, LockedFingerprint> = serde_json::from_str(content)
            .map_err(|e| Error::Malformed {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self {
            entries,
            removed: Vec::new(),
        })
    }

    /// Read, parse and prune the lockfile at `path`.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_locked(path)?;
        let mut lockfile = Self::parse(&content, &path.to_native())?;
        let pruned = lockfile.prune_dangling();
        tracing::debug!(
            path = %path,
            entries = lockfile.len(),
            pruned = pruned.len(),
            "loaded lockfile"
        );
        Ok(lockfile)
    }

    /// Like [`Lockfile::load`], but a missing file yields an empty lockfile.
    pub fn load_or_default(path: &NormalizedPath) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path, "no lockfile yet");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Remove every entry whose path is not an existing regular file.
    ///
    /// Returns what this call removed. The entries are also kept for the
    /// next [`Lockfile::verify`], which reports each one exactly once.
    pub fn prune_dangling(&mut self) -> Vec<DanglingEntry> {
        let mut pruned = Vec::new();
        self.entries.retain(|path, locked| {
            if path.is_file() {
                return true;
            }
            tracing::warn!(path = %path, "pruning dangling lockfile entry");
            pruned.push(DanglingEntry {
                path: path.clone(),
                locked: locked.clone(),
            });
            false
        });
        self.removed.extend(pruned.iter().cloned());
        pruned
    }

    /// Entries pruned and not yet reported.
    pub fn removed(&self) -> &[DanglingEntry] {
        &self.removed
    }

    /// Whether anything was pruned since load, i.e. the file on disk is stale.
    pub fn has_pruned(&self) -> bool {
        !self.removed.is_empty()
    }

    pub fn get(&self, path: &NormalizedPath) -> Option<&LockedFingerprint> {
        self.entries.get(path)
    }

    /// The locked fingerprint for `path`, or the sentinel when absent.
    pub fn locked_or_sentinel(&self, path: &NormalizedPath) -> LockedFingerprint {
        self.get(path).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, path: NormalizedPath, locked: LockedFingerprint) {
        self.entries.insert(path, locked);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&NormalizedPath, &LockedFingerprint)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the lockfile against the paths the caller tracks.
    ///
    /// Prunes first. `dangling` holds every pruned entry not reported
    /// before; `missing` the expected paths without an entry; `unresolved`
    /// the entries still carrying a sentinel.
    pub fn verify(&mut self, expected: &[ExpectedEntry]) -> Verification {
        self.prune_dangling();

        let sides: BTreeMap<&NormalizedPath, Side> =
            expected.iter().map(|e| (&e.path, e.side)).collect();

        let mut verification = Verification::default();
        for entry in self.removed.drain(..) {
            let side = sides.get(&entry.path).copied();
            verification.dangling.push(VerifyIssue {
                message: format!("{} no longer exists, entry removed", entry.path),
                path: entry.path,
                side,
            });
        }

        for want in expected {
            if verification.dangling.iter().any(|d| d.path == want.path) {
                continue;
            }
            let Some(locked) = self.entries.get(&want.path) else {
                verification.missing.push(VerifyIssue {
                    path: want.path.clone(),
                    side: Some(want.side),
                    message: format!("{} has no lockfile entry", want.path),
                });
                continue;
            };

            let mut blanks = Vec::new();
            if locked.mtime == 0.0 {
                blanks.push("mtime");
            }
            if locked.content_hash.is_empty() {
                blanks.push("content_hash");
            }
            if want.requires_revision && !locked.has_revision() {
                blanks.push("corresponding_git_hash");
            }
            if !blanks.is_empty() {
                verification.unresolved.push(VerifyIssue {
                    path: want.path.clone(),
                    side: Some(want.side),
                    message: format!("{} has unresolved {}", want.path, blanks.join(", ")),
                });
            }
        }

        verification
    }

    /// Deterministic JSON: sorted keys, two-space indent, trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.entries).map_err(std::io::Error::from)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the lockfile atomically and drop an ignore marker beside it.
    ///
    /// Returns the number of bytes written. On failure the previous file,
    /// if any, is left as it was.
    pub fn persist(&self, path: &NormalizedPath) -> Result<usize> {
        let json = self.to_json()?;
        let bytes = io::write_text(path, &json).map_err(|source| Error::WriteFailed {
            path: path.to_native(),
            source,
        })?;

        if let Some(dir) = path.parent() {
            let marker = dir.join(RepoPath::IgnoreMarker.as_str());
            let created = io::write_once(&marker, IGNORE_ALL).map_err(|source| Error::WriteFailed {
                path: marker.to_native(),
                source,
            })?;
            if created {
                tracing::debug!(marker = %marker, "wrote state directory ignore marker");
            }
        }

        tracing::info!(path = %path, entries = self.len(), bytes, "lockfile written");
        Ok(bytes)
    }
}
