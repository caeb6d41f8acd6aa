//! Settings resolution
//!
//! # Configuration Hierarchy
//!
//! Settings are merged from these sources (later sources override earlier):
//!
//! 1. **Defaults** - current platform, prefix `/`, 30 s read timeout
//! 2. **Global config** - `<config_dir>/sysset/config.toml`
//! 3. **Repository config** - `<root>/sysset.toml`
//! 4. **Environment** - `SYSSET_USER`, `SYSSET_PREFIX`, `SYSSET_PLATFORM`
//! 5. **Overrides** - command-line flags
//!
//! # Example
//!
//! ```ignore
//! use sysset_core::config::{ConfigResolver, SettingsLayer};
//! use sysset_fs::NormalizedPath;
//!
//! let resolver = ConfigResolver::new(NormalizedPath::new("/path/to/repo"));
//! let settings = resolver.resolve(&SettingsLayer::default())?;
//! println!("deploying for {}", settings.user);
//! ```

mod resolver;
mod settings;

pub use resolver::{ConfigResolver, ENV_PLATFORM, ENV_PREFIX, ENV_USER, LEGACY_ENV_PREFIX, LEGACY_ENV_USER};
pub use settings::{DEFAULT_READ_TIMEOUT, Settings, SettingsLayer};
