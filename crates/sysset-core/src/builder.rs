//! Rebuilding the lockfile from disk
//!
//! Unlike reconciliation, locking trusts nothing: every side of every pair
//! is stat'd and hashed afresh. A single failure aborts the whole build, so
//! the lockfile on disk is always a complete snapshot of one moment.

use rayon::prelude::*;
use serde::Serialize;
use sysset_fs::NormalizedPath;
use sysset_git::{Eligibility, VcsSnapshot};

use crate::fingerprint::{FileProbe, FingerprintError};
use crate::lockfile::Lockfile;
use crate::pair::TrackedPair;
use crate::pool::create_thread_pool;
use crate::{Error, Result};

/// A virtual file locked without a revision id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionIneligible {
    pub path: NormalizedPath,
    pub reason: Eligibility,
}

impl std::fmt::Display for RevisionIneligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: no revision recorded, {}", self.path, self.reason)
    }
}

/// Result of a successful `lock`.
#[derive(Debug, Clone)]
pub struct LockOutcome {
    pub lockfile: Lockfile,
    pub warnings: Vec<RevisionIneligible>,
    pub bytes_written: usize,
}

/// Builds a fresh lockfile for a set of pairs.
pub struct LockfileBuilder<'a, P: ?Sized> {
    probe: &'a P,
    vcs: &'a VcsSnapshot,
    threads: Option<usize>,
}

impl<'a, P: FileProbe + ?Sized> LockfileBuilder<'a, P> {
    pub fn new(probe: &'a P, vcs: &'a VcsSnapshot) -> Self {
        Self {
            probe,
            vcs,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Fingerprint every pair and assemble the lockfile in memory.
    ///
    /// # Errors
    ///
    /// [`Error::LockAborted`] listing every file that could not be stat'd
    /// or read.
    pub fn build(&self, pairs: &mut [TrackedPair]) -> Result<(Lockfile, Vec<RevisionIneligible>)> {
        let probe = self.probe;
        let pool = create_thread_pool(self.threads)?;
        let failures: Vec<FingerprintError> = pool.install(|| {
            pairs
                .par_iter_mut()
                .flat_map_iter(|pair| {
                    pair.refresh();
                    let mut errors = Vec::new();
                    for file in [&mut pair.virtual_file, &mut pair.real_file] {
                        if let Err(e) = file.resolve_mtime(probe) {
                            errors.push(e);
                            continue;
                        }
                        if let Err(e) = file.resolve_hash(probe) {
                            errors.push(e);
                        }
                    }
                    errors
                })
                .collect()
        });

        if !failures.is_empty() {
            tracing::warn!(failures = failures.len(), "lock aborted");
            return Err(Error::LockAborted { failures });
        }

        let mut lockfile = Lockfile::new();
        let mut warnings = Vec::new();
        for pair in pairs.iter_mut() {
            let revision = match self.vcs.revision_for(pair.virtual_path()) {
                Ok(id) => Some(id.to_string()),
                Err(reason) => {
                    tracing::warn!(path = %pair.virtual_path(), %reason, "revision ineligible");
                    warnings.push(RevisionIneligible {
                        path: pair.virtual_path().clone(),
                        reason,
                    });
                    None
                }
            };
            pair.virtual_file.set_revision_id(revision);

            lockfile.insert(pair.virtual_path().clone(), pair.virtual_file.to_locked());
            lockfile.insert(pair.real_path().clone(), pair.real_file.to_locked());
        }

        Ok((lockfile, warnings))
    }

    /// Build and persist to `path`. Nothing is written if the build fails.
    pub fn write(&self, pairs: &mut [TrackedPair], path: &NormalizedPath) -> Result<LockOutcome> {
        let (lockfile, warnings) = self.build(pairs)?;
        let bytes_written = lockfile.persist(path)?;
        Ok(LockOutcome {
            lockfile,
            warnings,
            bytes_written,
        })
    }
}
