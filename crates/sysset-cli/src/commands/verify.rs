//! Verify command implementation

use colored::Colorize;
use sysset_core::{VerifyIssue, Workspace};

use crate::error::Result;

/// Run the verify command
///
/// Returns the number of dangling, missing and unresolved entries.
pub fn run_verify(workspace: &Workspace) -> Result<usize> {
    let verification = workspace.verify()?;

    if verification.is_clean() {
        println!(
            "{} Lockfile covers every tracked file.",
            "OK".green().bold()
        );
        return Ok(0);
    }

    print_section("Dangling", &verification.dangling);
    print_section("Missing", &verification.missing);
    print_section("Unresolved", &verification.unresolved);

    println!();
    println!("Run {} to refresh the lockfile.", "sysset lock".cyan());
    Ok(verification.total())
}

fn print_section(title: &str, issues: &[VerifyIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("{} ({}):", title.bold(), issues.len());
    for issue in issues {
        let side = issue
            .side
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();
        println!("   {} {}{}", "!".red(), issue.message, side.as_str().dimmed());
    }
}
