//! Set command implementation

use colored::Colorize;
use sysset_core::Workspace;

use super::repo_relative;
use crate::error::Result;

/// Run the set command
///
/// Copies every virtual file over its real counterpart regardless of the
/// lockfile. Returns the number of files that could not be written.
pub fn run_set(workspace: &Workspace, dry_run: bool) -> Result<usize> {
    let report = workspace.set(dry_run)?;

    for file in &report.written {
        println!(
            "{} {} -> {} ({} bytes)",
            "+".green(),
            repo_relative(workspace, &file.virtual_path).as_str().cyan(),
            file.real_path,
            file.bytes
        );
    }
    for file in &report.skipped {
        println!(
            "{} {} -> {}",
            "~".blue(),
            repo_relative(workspace, &file.virtual_path).as_str().cyan(),
            file.real_path
        );
    }
    for failure in &report.failures {
        println!(
            "{} {} -> {}: {}",
            "!".red(),
            repo_relative(workspace, &failure.virtual_path).as_str().cyan(),
            failure.real_path,
            failure.reason
        );
    }

    println!();
    if dry_run {
        println!(
            "{} Would write {} file(s)",
            "DRY RUN".yellow().bold(),
            report.skipped.len()
        );
    } else if report.is_success() {
        println!("{} Wrote {} file(s)", "OK".green().bold(), report.written.len());
    } else {
        println!(
            "{} Wrote {} file(s), {} failed",
            "FAILED".red().bold(),
            report.written.len(),
            report.failures.len()
        );
    }

    Ok(report.failures.len())
}
