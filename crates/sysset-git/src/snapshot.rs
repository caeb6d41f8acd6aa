//! Point-in-time view of the repository's version-control state.
//!
//! The lockfile builder only needs three things from git: the current
//! revision id, which paths git tracks, and which of those differ from
//! that revision. [`VcsSnapshot`] captures them once so the rest of a run
//! never touches git again.

use std::collections::BTreeSet;
use std::path::Path;

use git2::{ErrorCode, Repository, Status, StatusOptions};
use serde::Serialize;
use sysset_fs::NormalizedPath;

use crate::{Error, Result};

/// Why a path can or cannot be stamped with the current revision id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Tracked and identical to the current revision
    Eligible,
    /// Not under the repository's working directory
    OutsideRepository,
    /// Inside the working directory but unknown to git
    Untracked,
    /// Tracked, but with uncommitted (staged or unstaged) changes
    Modified,
    /// The repository has no commits yet
    NoRevision,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        self == Self::Eligible
    }

    /// Short human-readable reason.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Eligible => "tracked and clean",
            Self::OutsideRepository => "outside the repository",
            Self::Untracked => "untracked by git",
            Self::Modified => "has uncommitted changes",
            Self::NoRevision => "repository has no commits",
        }
    }
}

impl std::fmt::Display for Eligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Revision id plus tracked / modified / untracked path sets.
///
/// All path sets hold workdir-relative, forward-slash paths.
#[derive(Debug, Clone, Default)]
pub struct VcsSnapshot {
    workdir: NormalizedPath,
    revision_id: String,
    tracked: BTreeSet<String>,
    modified: BTreeSet<String>,
    untracked: BTreeSet<String>,
}

impl VcsSnapshot {
    /// Build a snapshot by hand, for callers that are not backed by git.
    pub fn new(workdir: impl Into<NormalizedPath>, revision_id: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            revision_id: revision_id.into(),
            ..Default::default()
        }
    }

    pub fn with_tracked<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked.extend(paths.into_iter().map(|p| normalize_rel(p.into())));
        self
    }

    pub fn with_modified<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modified.extend(paths.into_iter().map(|p| normalize_rel(p.into())));
        self
    }

    pub fn with_untracked<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.untracked.extend(paths.into_iter().map(|p| normalize_rel(p.into())));
        self
    }

    /// Capture the state of the git repository containing `path`.
    ///
    /// An unborn HEAD (fresh `git init`) yields an empty revision id rather
    /// than an error; every path is then [`Eligibility::NoRevision`].
    pub fn capture(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: path.to_path_buf(),
            },
            _ => Error::Git(e),
        })?;
        let workdir = repo.workdir().ok_or_else(|| Error::BareRepository {
            path: repo.path().to_path_buf(),
        })?;
        let workdir = dunce::canonicalize(workdir)
            .map_err(|e| sysset_fs::Error::io(workdir, e))?;

        let revision_id = match repo.head() {
            Ok(head) => head.peel_to_commit()?.id().to_string(),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let tracked = repo
            .index()?
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .collect::<BTreeSet<_>>();

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .include_unmodified(false);

        let mut modified = BTreeSet::new();
        let mut untracked = BTreeSet::new();
        for entry in repo.statuses(Some(&mut opts))?.iter() {
            let Some(rel) = entry.path() else {
                continue;
            };
            let status = entry.status();
            if status.contains(Status::WT_NEW) && !tracked.contains(rel) {
                untracked.insert(rel.to_string());
            } else if status.intersects(dirty_mask()) {
                modified.insert(rel.to_string());
            }
        }

        tracing::debug!(
            workdir = %workdir.display(),
            revision = %revision_id,
            tracked = tracked.len(),
            modified = modified.len(),
            untracked = untracked.len(),
            "captured vcs snapshot"
        );

        Ok(Self {
            workdir: NormalizedPath::new(workdir),
            revision_id,
            tracked,
            modified,
            untracked,
        })
    }

    pub fn workdir(&self) -> &NormalizedPath {
        &self.workdir
    }

    /// Full hex id of the current revision, empty when there is none.
    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    pub fn tracked_paths(&self) -> &BTreeSet<String> {
        &self.tracked
    }

    pub fn modified_paths(&self) -> &BTreeSet<String> {
        &self.modified
    }

    pub fn untracked_paths(&self) -> &BTreeSet<String> {
        &self.untracked
    }

    /// Decide whether `path` (absolute) may carry the current revision id.
    pub fn classify(&self, path: &NormalizedPath) -> Eligibility {
        let Some(rel) = self.relative(path) else {
            return Eligibility::OutsideRepository;
        };
        if self.untracked.contains(rel.as_str()) || !self.tracked.contains(rel.as_str()) {
            return Eligibility::Untracked;
        }
        if self.modified.contains(rel.as_str()) {
            return Eligibility::Modified;
        }
        if self.revision_id.is_empty() {
            return Eligibility::NoRevision;
        }
        Eligibility::Eligible
    }

    /// The revision id `path` corresponds to, if it is eligible.
    pub fn revision_for(&self, path: &NormalizedPath) -> std::result::Result<&str, Eligibility> {
        match self.classify(path) {
            Eligibility::Eligible => Ok(&self.revision_id),
            other => Err(other),
        }
    }

    fn relative(&self, path: &NormalizedPath) -> Option<NormalizedPath> {
        if let Some(rel) = path.strip_prefix(&self.workdir) {
            return Some(rel);
        }
        // The caller may hold a non-canonical spelling (symlinked tmp dirs).
        let canonical = dunce::canonicalize(path.to_native()).ok()?;
        NormalizedPath::new(canonical).strip_prefix(&self.workdir)
    }
}

fn dirty_mask() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_RENAMED
        | Status::WT_TYPECHANGE
        | Status::CONFLICTED
}

fn normalize_rel(path: String) -> String {
    NormalizedPath::new(path).as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> VcsSnapshot {
        VcsSnapshot::new("/repo", "abc123")
            .with_tracked(["home/.bashrc", "etc/hosts", "etc/fstab"])
            .with_modified(["etc/fstab"])
            .with_untracked(["etc/new.conf"])
    }

    #[test]
    fn clean_tracked_file_is_eligible() {
        let snap = snapshot();
        let path = NormalizedPath::new("/repo/home/.bashrc");
        assert_eq!(snap.classify(&path), Eligibility::Eligible);
        assert_eq!(snap.revision_for(&path), Ok("abc123"));
    }

    #[test]
    fn dirty_and_untracked_files_are_ineligible() {
        let snap = snapshot();
        assert_eq!(
            snap.classify(&NormalizedPath::new("/repo/etc/fstab")),
            Eligibility::Modified
        );
        assert_eq!(
            snap.classify(&NormalizedPath::new("/repo/etc/new.conf")),
            Eligibility::Untracked
        );
        assert_eq!(
            snap.classify(&NormalizedPath::new("/repo/etc/unknown")),
            Eligibility::Untracked
        );
    }

    #[test]
    fn path_outside_workdir_is_ineligible() {
        let snap = snapshot();
        assert_eq!(
            snap.classify(&NormalizedPath::new("/home/alice/.bashrc")),
            Eligibility::OutsideRepository
        );
    }

    #[test]
    fn missing_revision_blocks_eligibility() {
        let snap = VcsSnapshot::new("/repo", "").with_tracked(["etc/hosts"]);
        assert_eq!(
            snap.classify(&NormalizedPath::new("/repo/etc/hosts")),
            Eligibility::NoRevision
        );
    }
}
