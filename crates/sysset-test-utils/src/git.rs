//! Git repository fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs.
//! Fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE** (directory structure only, no object store).
///
/// Use for: root-discovery tests that only look for a `.git` marker.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises a real git repository using `git2` (no commits).
///
/// Realism level: **REAL** (valid object store, unborn HEAD).
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Stages every file under the working directory and commits it.
///
/// Uses a fixed signature so the test never depends on the host's git
/// configuration. Returns the full hex id of the new commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &Repository, message: &str) -> String {
    let mut index = repo
        .index()
        .unwrap_or_else(|e| panic!("commit_all: failed to open index: {e}"));
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap_or_else(|e| panic!("commit_all: failed to stage files: {e}"));
    index
        .write()
        .unwrap_or_else(|e| panic!("commit_all: failed to write index: {e}"));
    let tree_id = index
        .write_tree()
        .unwrap_or_else(|e| panic!("commit_all: failed to write tree: {e}"));
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("commit_all: failed to find tree: {e}"));

    let sig = Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("commit_all: failed to build signature: {e}"));

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_all: failed to commit: {e}"))
        .to_string()
}

/// Initialises a real git repository and commits `files` into it.
///
/// Realism level: **REAL WITH HISTORY** (one commit on HEAD).
///
/// `files` are `(relative path, content)` pairs; parent directories are
/// created as needed. Returns the repository and the commit id.
///
/// # Panics
/// Panics if any filesystem or git operation fails.
pub fn real_git_repo_with_commit(path: &Path, files: &[(&str, &str)]) -> (Repository, String) {
    let repo = real_git_repo(path);
    for (rel, content) in files {
        let full = path.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("real_git_repo_with_commit: failed to create {}: {e}", parent.display())
            });
        }
        fs::write(&full, content).unwrap_or_else(|e| {
            panic!("real_git_repo_with_commit: failed to write {}: {e}", full.display())
        });
    }
    let id = commit_all(&repo, "Initial commit");
    (repo, id)
}
