//! Well-known names inside a sysset repository.

use std::path::Path;

/// Standard repository markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// The `.git` directory (never enumerated)
    GitDir,
    /// The `.sysset` state directory holding cache files
    StateDir,
    /// The lockfile name inside the state directory
    LockFile,
    /// Marker written into the state directory so git ignores it
    IgnoreMarker,
    /// Repository-level configuration file at the root
    RepoConfig,
    /// Overlay directory whose contents only apply on darwin
    DarwinOverlay,
    /// Directory mapped onto the user's home directory
    HomeOverlay,
}

impl RepoPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::StateDir => ".sysset",
            Self::LockFile => "lock.json",
            Self::IgnoreMarker => ".gitignore",
            Self::RepoConfig => "sysset.toml",
            Self::DarwinOverlay => "@darwin",
            Self::HomeOverlay => "home",
        }
    }
}

/// Contents of the ignore marker: everything under the state directory.
pub const IGNORE_ALL: &str = "*\n";

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
