//! One virtual file and its deployed counterpart

use sysset_fs::NormalizedPath;

use crate::fingerprint::FileFingerprint;
use crate::lockfile::{ExpectedEntry, LockedFingerprint, Lockfile, Side};

/// A virtual file, its single real location, and what the lockfile
/// remembers about each.
#[derive(Debug, Clone)]
pub struct TrackedPair {
    pub(crate) virtual_file: FileFingerprint,
    pub(crate) real_file: FileFingerprint,
    pub(crate) locked_virtual: LockedFingerprint,
    pub(crate) locked_real: LockedFingerprint,
}

impl TrackedPair {
    /// Pair two paths; both locked fingerprints start as the sentinel.
    pub fn new(virtual_path: impl Into<NormalizedPath>, real_path: impl Into<NormalizedPath>) -> Self {
        Self {
            virtual_file: FileFingerprint::new(virtual_path),
            real_file: FileFingerprint::new(real_path),
            locked_virtual: LockedFingerprint::sentinel(),
            locked_real: LockedFingerprint::sentinel(),
        }
    }

    pub fn virtual_path(&self) -> &NormalizedPath {
        self.virtual_file.path()
    }

    pub fn real_path(&self) -> &NormalizedPath {
        self.real_file.path()
    }

    pub fn virtual_file(&self) -> &FileFingerprint {
        &self.virtual_file
    }

    pub fn real_file(&self) -> &FileFingerprint {
        &self.real_file
    }

    pub fn locked_virtual(&self) -> &LockedFingerprint {
        &self.locked_virtual
    }

    pub fn locked_real(&self) -> &LockedFingerprint {
        &self.locked_real
    }

    /// Look both paths up in `lockfile`; absent entries become the sentinel.
    pub fn attach_locks(&mut self, lockfile: &Lockfile) {
        self.locked_virtual = lockfile.locked_or_sentinel(self.virtual_file.path());
        self.locked_real = lockfile.locked_or_sentinel(self.real_file.path());
    }

    /// Drop everything resolved from disk so the next pass starts fresh.
    pub fn refresh(&mut self) {
        self.virtual_file.reset();
        self.real_file.reset();
    }

    /// The two lockfile entries this pair needs.
    ///
    /// With `require_revision`, the virtual side must carry a revision id.
    pub fn expected_entries(&self, require_revision: bool) -> [ExpectedEntry; 2] {
        [
            ExpectedEntry {
                path: self.virtual_path().clone(),
                side: Side::Virtual,
                requires_revision: require_revision,
            },
            ExpectedEntry {
                path: self.real_path().clone(),
                side: Side::Real,
                requires_revision: false,
            },
        ]
    }
}

/// Expected entries for a whole batch.
pub fn expected_entries(pairs: &[TrackedPair], require_revision: bool) -> Vec<ExpectedEntry> {
    pairs
        .iter()
        .flat_map(|pair| pair.expected_entries(require_revision))
        .collect()
}
