//! [`TestTree`] builder for virtual/real deployment scenarios.
//!
//! A tree owns two temporary directories: the repository holding the
//! virtual files, and a target prefix standing in for `/` on the host.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

/// A virtual repository plus a real target prefix, both temporary.
///
/// # Example
///
/// ```rust,no_run
/// use sysset_test_utils::tree::TestTree;
///
/// let tree = TestTree::new();
/// tree.write_virtual("etc/hosts", "127.0.0.1 localhost\n");
/// tree.write_real("etc/hosts", "127.0.0.1 localhost\n");
/// tree.assert_real_contains("etc/hosts", "localhost");
/// ```
pub struct TestTree {
    repo: TempDir,
    target: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            repo: TempDir::new().unwrap(),
            target: TempDir::new().unwrap(),
        }
    }

    /// Root of the virtual repository.
    pub fn repo(&self) -> &Path {
        self.repo.path()
    }

    /// Prefix the real files live under.
    pub fn target(&self) -> &Path {
        self.target.path()
    }

    pub fn virtual_path(&self, rel: &str) -> PathBuf {
        self.repo().join(rel)
    }

    pub fn real_path(&self, rel: &str) -> PathBuf {
        self.target().join(rel)
    }

    /// Write a file below the repository root, creating parents.
    pub fn write_virtual(&self, rel: &str, content: &str) -> PathBuf {
        write_with_parents(&self.virtual_path(rel), content)
    }

    /// Write a file below the target prefix, creating parents.
    pub fn write_real(&self, rel: &str, content: &str) -> PathBuf {
        write_with_parents(&self.real_path(rel), content)
    }

    /// Assert that the real file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_real_contains(&self, rel: &str, content: &str) {
        let full_path = self.real_path(rel);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }

    /// Assert that the real file at `rel` does **not** exist.
    pub fn assert_real_missing(&self, rel: &str) {
        let full_path = self.real_path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}

/// Set a file's modification time to `secs` after the epoch.
///
/// # Panics
/// Panics if the file cannot be opened for writing.
pub fn set_mtime(path: &Path, secs: u64) {
    let time = UNIX_EPOCH + Duration::from_secs(secs);
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .unwrap_or_else(|e| panic!("set_mtime: {}: {e}", path.display()));
}

/// Modification time of `path` as fractional seconds since the epoch.
pub fn mtime_of(path: &Path) -> f64 {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|e| panic!("mtime_of: {}: {e}", path.display()));
    match modified.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn write_with_parents(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("failed to create {}: {e}", parent.display()));
    }
    fs::write(path, content).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path.to_path_buf()
}
