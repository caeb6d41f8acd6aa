//! Git state lookup for sysset
//!
//! Captures the current revision and the tracked, modified and untracked
//! path sets of the repository that holds the virtual tree.

pub mod commits;
pub mod error;
pub mod snapshot;

pub use commits::{CommitInfo, find_commit, head_commit};
pub use error::{Error, Result};
pub use snapshot::{Eligibility, VcsSnapshot};
