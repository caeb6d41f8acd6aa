//! Virtual-to-real path mapping
//!
//! The repository mirrors the target filesystem: `etc/hosts` deploys to
//! `<prefix>/etc/hosts`, `home/.bashrc` to the user's home directory, and
//! `@darwin/...` holds files that only apply on macOS.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sysset_fs::{NormalizedPath, RepoPath};

use crate::pair::TrackedPair;
use crate::{Error, Result};

/// Target operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Darwin,
    Linux,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }

    /// Parent of user home directories on this platform.
    pub fn home_base(&self) -> &'static str {
        match self {
            Self::Darwin => "Users",
            Self::Linux => "home",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            other => Err(format!("unknown platform '{other}', expected darwin or linux")),
        }
    }
}

/// Maps repository paths to their deployed locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    root: NormalizedPath,
    prefix: NormalizedPath,
    user: String,
    platform: Platform,
}

impl PathMapper {
    pub fn new(
        root: impl Into<NormalizedPath>,
        prefix: impl Into<NormalizedPath>,
        user: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            user: user.into(),
            platform,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn prefix(&self) -> &NormalizedPath {
        &self.prefix
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The real location of `virtual_path`, or `None` when it does not name
    /// a file inside the repository.
    pub fn map(&self, virtual_path: &NormalizedPath) -> Option<NormalizedPath> {
        let rel = virtual_path.strip_prefix(&self.root)?;
        let mut segments: Vec<&str> = rel.segments().collect();

        if segments.first() == Some(&RepoPath::DarwinOverlay.as_str()) {
            segments.remove(0);
        }
        if segments.is_empty() {
            return None;
        }

        let rest = if segments[0] == RepoPath::HomeOverlay.as_str() {
            let mut home = vec![self.platform.home_base(), self.user.as_str()];
            home.extend(&segments[1..]);
            home.join("/")
        } else {
            segments.join("/")
        };
        Some(self.prefix.join(&rest))
    }

    /// Pair every virtual file with its real location.
    ///
    /// # Errors
    ///
    /// [`Error::Traversal`] for a path outside the repository root.
    pub fn pairs(&self, virtual_files: &[NormalizedPath]) -> Result<Vec<TrackedPair>> {
        virtual_files
            .iter()
            .map(|file| {
                let real = self.map(file).ok_or_else(|| Error::Traversal {
                    path: file.to_native(),
                    message: format!("not a file inside {}", self.root),
                })?;
                Ok(TrackedPair::new(file.clone(), real))
            })
            .collect()
    }
}
