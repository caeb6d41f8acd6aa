//! Normalized path handling for lockfile keys and path mapping

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A path normalized to forward slashes with `.`/`..` segments folded away.
///
/// Lockfile keys, mapping inputs and report entries all go through this
/// type, so two spellings of the same file always compare equal and sort
/// the same way. Conversion to a platform path happens only at I/O
/// boundaries via [`NormalizedPath::to_native`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: clean(&path.as_ref().to_string_lossy()),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a (possibly multi-segment) relative suffix.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        let segment = segment.trim_start_matches(['/', '\\']);
        if self.inner.ends_with('/') {
            return Self::new(format!("{}{}", self.inner, segment));
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Path segments, without the leading root marker.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Strip `base` from the front of this path, segment-wise.
    ///
    /// Returns the relative remainder (possibly empty), or `None` when this
    /// path does not live under `base`.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<NormalizedPath> {
        let base = base.as_str().trim_end_matches('/');
        if base.is_empty() {
            return Some(self.clone());
        }
        let rest = self.inner.strip_prefix(base)?;
        if rest.is_empty() {
            return Some(Self {
                inner: String::new(),
            });
        }
        rest.strip_prefix('/').map(|r| Self {
            inner: r.to_string(),
        })
    }

    /// Check whether this path is absolute.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || self.to_native().is_absolute()
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

/// Fold separators, `.` and `..` into a canonical forward-slash string.
///
/// A leading `//` (UNC / network share) is kept; any other run of slashes
/// collapses to one. `..` never climbs above the root of an absolute path;
/// in a relative path the unresolvable leading `..` segments are kept.
fn clean(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let network = unified.starts_with("//") && !unified.starts_with("///");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{body}")
    } else if absolute {
        format!("/{body}")
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_top_level_is_root() {
        let path = NormalizedPath::new("/etc");
        assert_eq!(path.parent().unwrap().as_str(), "/");
        assert!(NormalizedPath::new("/").parent().is_none());
    }

    #[test]
    fn strip_prefix_respects_segment_boundaries() {
        let root = NormalizedPath::new("/repo");
        assert_eq!(
            NormalizedPath::new("/repo/home/.bashrc")
                .strip_prefix(&root)
                .unwrap()
                .as_str(),
            "home/.bashrc"
        );
        assert!(NormalizedPath::new("/repository/x").strip_prefix(&root).is_none());
        assert_eq!(root.strip_prefix(&root).unwrap().as_str(), "");
    }

    #[test]
    fn default_is_empty_and_joins_as_relative() {
        let empty = NormalizedPath::default();
        assert_eq!(empty.as_str(), "");
        assert_eq!(empty.join("etc/hosts").as_str(), "etc/hosts");
    }

    #[test]
    fn relative_parent_segments_are_kept_when_unresolvable() {
        assert_eq!(NormalizedPath::new("../out").as_str(), "../out");
        assert_eq!(NormalizedPath::new("a/../../out").as_str(), "../out");
        assert_eq!(NormalizedPath::new("../../x/../y").as_str(), "../../y");
        assert_eq!(NormalizedPath::new("/../etc").as_str(), "/etc");
    }

    #[test]
    fn serde_round_trip_normalizes_keys() {
        let parsed: NormalizedPath = serde_json::from_str(r#""C:\\Users\\me\\.gitconfig""#).unwrap();
        assert_eq!(parsed.as_str(), "C:/Users/me/.gitconfig");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""C:/Users/me/.gitconfig""#);
    }
}
