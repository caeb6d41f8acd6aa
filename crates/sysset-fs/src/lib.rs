//! Filesystem primitives for sysset
//!
//! Normalized paths, SHA-256 digests with bounded reads, and atomic locked
//! writes used by the lockfile.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::{IGNORE_ALL, RepoPath};
pub use error::{Error, Result};
pub use path::NormalizedPath;
