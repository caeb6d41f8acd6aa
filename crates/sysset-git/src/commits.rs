//! Commit metadata for the revision a lockfile was built against.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ErrorCode, Oid, Repository};
use serde::Serialize;

use crate::Result;

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    fn from_commit(commit: &git2::Commit<'_>) -> Self {
        let dt: DateTime<Utc> = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author().name().unwrap_or("Unknown").to_string();

        let full = commit.id().to_string();
        let hash = full.get(..7).unwrap_or(&full).to_string();

        Self {
            hash,
            message,
            author,
            timestamp: dt,
        }
    }
}

/// The commit HEAD points at in the repository containing `path`.
///
/// Returns `Ok(None)` for an unborn branch.
pub fn head_commit(path: &Path) -> Result<Option<CommitInfo>> {
    let repo = Repository::discover(path)?;
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let commit = head.peel_to_commit()?;
    Ok(Some(CommitInfo::from_commit(&commit)))
}

/// Look up a commit by its full hex id, as recorded in a lockfile entry.
///
/// Returns `Ok(None)` when the id is malformed or unknown to the repository
/// (for example a lockfile carried over from another clone).
pub fn find_commit(path: &Path, revision_id: &str) -> Result<Option<CommitInfo>> {
    let Ok(oid) = Oid::from_str(revision_id) else {
        return Ok(None);
    };
    let repo = Repository::discover(path)?;
    match repo.find_commit(oid) {
        Ok(commit) => Ok(Some(CommitInfo::from_commit(&commit))),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
