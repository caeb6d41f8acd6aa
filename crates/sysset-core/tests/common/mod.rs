//! Probe doubles and tree helpers shared by sysset-core integration tests

#![allow(dead_code)]

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use sysset_core::{FileProbe, LocalProbe, TrackedPair};
use sysset_fs::NormalizedPath;
use sysset_git::VcsSnapshot;
use sysset_test_utils::tree::{TestTree, set_mtime};

/// Local probe that counts stat and digest calls.
#[derive(Default)]
pub struct CountingProbe {
    inner: LocalProbe,
    pub stats: AtomicUsize,
    pub digests: AtomicUsize,
}

impl CountingProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digest_count(&self) -> usize {
        self.digests.load(Ordering::SeqCst)
    }

    pub fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }
}

impl FileProbe for CountingProbe {
    fn modified(&self, path: &NormalizedPath) -> io::Result<f64> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.modified(path)
    }

    fn digest(&self, path: &NormalizedPath) -> io::Result<String> {
        self.digests.fetch_add(1, Ordering::SeqCst);
        self.inner.digest(path)
    }
}

/// Local probe that fails chosen paths.
#[derive(Default)]
pub struct FailingProbe {
    inner: LocalProbe,
    stat_failures: Mutex<Vec<NormalizedPath>>,
    read_failures: Mutex<Vec<NormalizedPath>>,
}

impl FailingProbe {
    pub fn fail_stat(self, path: impl Into<NormalizedPath>) -> Self {
        self.stat_failures.lock().unwrap().push(path.into());
        self
    }

    pub fn fail_read(self, path: impl Into<NormalizedPath>) -> Self {
        self.read_failures.lock().unwrap().push(path.into());
        self
    }
}

impl FileProbe for FailingProbe {
    fn modified(&self, path: &NormalizedPath) -> io::Result<f64> {
        if self.stat_failures.lock().unwrap().contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.inner.modified(path)
    }

    fn digest(&self, path: &NormalizedPath) -> io::Result<String> {
        if self.read_failures.lock().unwrap().contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.inner.digest(path)
    }
}

/// Write the same content on both sides with distinct fixed mtimes.
pub fn write_pair(tree: &TestTree, rel: &str, content: &str, mtime: u64) -> TrackedPair {
    let v = tree.write_virtual(rel, content);
    let r = tree.write_real(rel, content);
    set_mtime(&v, mtime);
    set_mtime(&r, mtime + 1);
    pair(tree, rel)
}

/// Pair `<repo>/<rel>` with `<target>/<rel>`.
pub fn pair(tree: &TestTree, rel: &str) -> TrackedPair {
    TrackedPair::new(tree.virtual_path(rel).as_path(), tree.real_path(rel).as_path())
}

/// Snapshot that reports `tracked` as committed at revision `rev`.
pub fn snapshot(tree: &TestTree, rev: &str, tracked: &[&str]) -> VcsSnapshot {
    VcsSnapshot::new(tree.repo(), rev).with_tracked(tracked.iter().copied())
}

pub fn lock_path(tree: &TestTree) -> NormalizedPath {
    NormalizedPath::new(tree.repo().join(".sysset/lock.json"))
}
