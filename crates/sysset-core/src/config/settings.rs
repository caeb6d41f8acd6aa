//! Effective settings and the per-layer partial form

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysset_fs::NormalizedPath;

use crate::mapping::Platform;

/// Default bound on a single digest read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Owner of the `home/` tree on the target
    pub user: String,
    /// Prepended to every real path
    pub prefix: NormalizedPath,
    pub platform: Platform,
    /// `None` reads without a bound
    pub read_timeout: Option<Duration>,
    /// `None` uses one worker per CPU
    pub threads: Option<usize>,
}

/// One configuration layer; unset fields defer to earlier layers.
///
/// This is also the on-disk shape of `sysset.toml` and the global
/// `config.toml`:
///
/// ```toml
/// user = "alice"
/// prefix = "/"
/// platform = "linux"
/// read_timeout_ms = 30000
/// threads = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// `0` disables the bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl SettingsLayer {
    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: &SettingsLayer) {
        if other.user.is_some() {
            self.user.clone_from(&other.user);
        }
        if other.prefix.is_some() {
            self.prefix.clone_from(&other.prefix);
        }
        if other.platform.is_some() {
            self.platform = other.platform;
        }
        if other.read_timeout_ms.is_some() {
            self.read_timeout_ms = other.read_timeout_ms;
        }
        if other.threads.is_some() {
            self.threads = other.threads;
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
