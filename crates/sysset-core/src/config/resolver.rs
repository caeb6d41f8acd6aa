//! Configuration resolution with layered overrides
//!
//! The `ConfigResolver` loads settings from multiple sources in a defined
//! hierarchy, with later sources overriding earlier ones.

use std::path::PathBuf;
use std::time::Duration;

use sysset_fs::{ConfigStore, NormalizedPath, RepoPath};

use super::settings::{DEFAULT_READ_TIMEOUT, Settings, SettingsLayer};
use crate::mapping::Platform;
use crate::{Error, Result};

/// Environment variables consulted in layer 4.
pub const ENV_USER: &str = "SYSSET_USER";
pub const ENV_PREFIX: &str = "SYSSET_PREFIX";
pub const ENV_PLATFORM: &str = "SYSSET_PLATFORM";

/// Older names for `SYSSET_USER` and `SYSSET_PREFIX`, read when those are unset.
pub const LEGACY_ENV_USER: &str = "SYSTEMSET_USER";
pub const LEGACY_ENV_PREFIX: &str = "SYSTEMSET_PREFIX";

/// Login-name variables tried when no layer names a user.
const LOGIN_VARS: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];

/// Resolves [`Settings`] by merging multiple sources
///
/// Settings are loaded from a hierarchy of sources:
/// 1. Built-in defaults
/// 2. Global config (`<config_dir>/sysset/config.toml`)
/// 3. Repository config (`<root>/sysset.toml`)
/// 4. Environment (`SYSSET_USER`, `SYSSET_PREFIX`, `SYSSET_PLATFORM`,
///    falling back to `SYSTEMSET_USER` and `SYSTEMSET_PREFIX`)
/// 5. Explicit overrides, usually command-line flags
pub struct ConfigResolver {
    /// Repository root directory
    root: NormalizedPath,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver for the repository at `root`.
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    ///
    /// Useful for tests that must not read the real user config.
    pub fn with_global_config_dir(root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("sysset"))
    }

    /// Path of the repository-level config file.
    pub fn repo_config_path(&self) -> NormalizedPath {
        self.root.join(RepoPath::RepoConfig.as_str())
    }

    /// Resolve against the process environment.
    pub fn resolve(&self, overrides: &SettingsLayer) -> Result<Settings> {
        self.resolve_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// Missing files are skipped; a file that fails to parse is an error
    /// naming that file.
    pub fn resolve_with_env<F>(&self, overrides: &SettingsLayer, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = ConfigStore::new();
        let mut merged = SettingsLayer::default();

        // Layer 2 - Global config
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = NormalizedPath::new(global_dir.join("config.toml"));
            if let Some(layer) = store.load_optional::<SettingsLayer>(&global_config_path)? {
                tracing::debug!(path = %global_config_path, "Loading global config (layer 2)");
                merged.merge(&layer);
            }
        }

        // Layer 3 - Repository config
        let repo_config_path = self.repo_config_path();
        if let Some(layer) = store.load_optional::<SettingsLayer>(&repo_config_path)? {
            tracing::debug!(path = %repo_config_path, "Loading repo config (layer 3)");
            merged.merge(&layer);
        }

        // Layer 4 - Environment
        let lookup = |key: &str, legacy: &str| {
            env(key).filter(|v| !v.is_empty()).or_else(|| {
                let value = env(legacy).filter(|v| !v.is_empty())?;
                tracing::debug!(variable = legacy, preferred = key, "using legacy environment variable");
                Some(value)
            })
        };
        let env_layer = SettingsLayer {
            user: lookup(ENV_USER, LEGACY_ENV_USER),
            prefix: lookup(ENV_PREFIX, LEGACY_ENV_PREFIX),
            platform: env(ENV_PLATFORM)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.parse::<Platform>().map_err(|message| Error::Config {
                        path: PathBuf::from(ENV_PLATFORM),
                        message,
                    })
                })
                .transpose()?,
            ..Default::default()
        };
        if !env_layer.is_empty() {
            tracing::debug!(?env_layer, "Applying environment (layer 4)");
            merged.merge(&env_layer);
        }

        // Layer 5 - Overrides
        if !overrides.is_empty() {
            tracing::debug!(?overrides, "Applying overrides (layer 5)");
            merged.merge(overrides);
        }

        // Layer 1 - Defaults fill whatever is still unset
        let user = merged
            .user
            .or_else(|| LOGIN_VARS.iter().find_map(|var| env(var).filter(|v| !v.is_empty())))
            .ok_or_else(|| Error::Config {
                path: repo_config_path.to_native(),
                message: format!("no user configured; set `user`, {ENV_USER} or --user"),
            })?;

        let read_timeout = match merged.read_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(DEFAULT_READ_TIMEOUT),
        };

        let settings = Settings {
            user,
            prefix: NormalizedPath::new(merged.prefix.as_deref().unwrap_or("/")),
            platform: merged.platform.unwrap_or_else(Platform::current),
            read_timeout,
            threads: merged.threads.filter(|&n| n > 0),
        };
        tracing::debug!(?settings, "resolved settings");
        Ok(settings)
    }

    /// Get the repository root path
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Check if a repository configuration exists
    pub fn has_config(&self) -> bool {
        self.repo_config_path().is_file()
    }
}
