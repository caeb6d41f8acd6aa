//! Command implementations for sysset-cli
//!
//! Each command returns the number of problems it found; `main` turns that
//! into the exit status.

pub mod lock;
pub mod set;
pub mod status;
pub mod sync;
pub mod verify;

pub use lock::run_lock;
pub use set::run_set;
pub use status::run_status;
pub use sync::run_sync;
pub use verify::run_verify;

use sysset_core::Workspace;
use sysset_fs::NormalizedPath;

/// `path` relative to the repository root when it lies inside it.
pub(crate) fn repo_relative(workspace: &Workspace, path: &NormalizedPath) -> String {
    match path.strip_prefix(workspace.root()) {
        Some(rel) => rel.as_str().to_string(),
        None => path.as_str().to_string(),
    }
}
