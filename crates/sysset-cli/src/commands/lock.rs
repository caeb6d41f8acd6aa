//! Lock command implementation

use colored::Colorize;
use sysset_core::Workspace;

use super::repo_relative;
use crate::error::Result;

/// Run the lock command
///
/// Revision warnings do not count as problems; the lockfile is still
/// written.
pub fn run_lock(workspace: &Workspace) -> Result<usize> {
    println!("{} Fingerprinting tracked files...", "=>".blue().bold());

    let outcome = workspace.lock()?;

    println!(
        "{} Locked {} entries ({} bytes) to {}",
        "OK".green().bold(),
        outcome.lockfile.len(),
        outcome.bytes_written,
        workspace.lockfile_path()
    );

    if let Some(revision) = locked_revision(&outcome.lockfile) {
        match sysset_git::find_commit(&workspace.root().to_native(), revision) {
            Ok(Some(commit)) => println!(
                "   at {} {}",
                commit.hash.as_str().yellow(),
                commit.message.as_str().dimmed()
            ),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "cannot describe locked revision"),
        }
    }

    if !outcome.warnings.is_empty() {
        println!();
        println!(
            "{} {} file(s) locked without a git revision:",
            "!".yellow(),
            outcome.warnings.len()
        );
        for warning in &outcome.warnings {
            println!(
                "   {} {} ({})",
                "-".yellow(),
                repo_relative(workspace, &warning.path).as_str().cyan(),
                warning.reason
            );
        }
        println!();
        println!(
            "Commit these files and re-run {} before {}.",
            "sysset lock".cyan(),
            "sysset sync".cyan()
        );
    }

    Ok(0)
}

/// First revision id recorded in the lockfile.
fn locked_revision(lockfile: &sysset_core::Lockfile) -> Option<&str> {
    lockfile
        .entries()
        .map(|(_, locked)| locked.revision_id.as_str())
        .find(|id| !id.is_empty())
}
