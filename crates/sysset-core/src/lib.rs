//! Lockfile-backed drift detection for sysset
//!
//! This crate decides, cheaply, whether each deployed configuration file
//! still matches its copy in the repository:
//!
//! - **Fingerprints**: lazily resolved mtime and SHA-256 per file
//! - **Lockfile**: the persisted fingerprint cache, with dangling-entry pruning
//! - **Reconciliation**: per-pair verdicts that trust mtimes before hashing
//! - **Locking**: all-or-nothing rebuild of the cache, stamped with git revisions
//! - **Deploy / sync**: unconditional and lock-guarded copying to the target
//!
//! # Architecture
//!
//! ```text
//!                    sysset-cli
//!                        |
//!                   sysset-core
//!                        |
//!                +-------+-------+
//!                |               |
//!            sysset-fs       sysset-git
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sysset_core::{Workspace, config::SettingsLayer};
//! use sysset_fs::NormalizedPath;
//!
//! let workspace = Workspace::open(NormalizedPath::new("/path/to/repo"), &SettingsLayer::default())?;
//! let status = workspace.status(false)?;
//! println!("{} pair(s) drifted", status.report.counts.problems());
//! ```

pub mod builder;
pub mod config;
pub mod deploy;
pub mod enumerate;
pub mod error;
pub mod fingerprint;
pub mod lockfile;
pub mod mapping;
pub mod pair;
mod pool;
pub mod reconcile;
pub mod sync;
pub mod workspace;

pub use builder::{LockOutcome, LockfileBuilder, RevisionIneligible};
pub use config::{ConfigResolver, Settings, SettingsLayer};
pub use deploy::{DeployFailure, DeployReport, DeployedFile, Deployer};
pub use enumerate::enumerate_virtual_files;
pub use error::{Error, Result};
pub use fingerprint::{
    FileFingerprint, FileProbe, FingerprintError, FingerprintErrorKind, LocalProbe, Resolution,
};
pub use lockfile::{
    DanglingEntry, ExpectedEntry, LockedFingerprint, Lockfile, Side, Verification, VerifyIssue,
};
pub use mapping::{PathMapper, Platform};
pub use pair::TrackedPair;
pub use reconcile::{DriftCounts, DriftReconciler, DriftReport, PairReport, SideChange, Verdict};
pub use sync::{SyncAction, SyncActionKind, SyncEngine, SyncReport};
pub use workspace::{StatusOutcome, Workspace};
