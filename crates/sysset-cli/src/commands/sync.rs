//! Sync command implementation

use colored::Colorize;
use sysset_core::{SyncAction, SyncActionKind, SyncReport, Workspace};

use super::repo_relative;
use crate::error::Result;

/// Run the sync command
///
/// Returns conflicts + real-side drift + failures.
pub fn run_sync(workspace: &Workspace, dry_run: bool) -> Result<usize> {
    println!(
        "{} Synchronizing {}...",
        "=>".blue().bold(),
        workspace.root()
    );

    let report = workspace.sync(dry_run)?;

    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    if !report.warnings.is_empty() {
        println!();
    }

    for action in &report.actions {
        print_action(workspace, action);
    }

    print_summary(&report, dry_run);
    Ok(report.problems())
}

fn print_action(workspace: &Workspace, action: &SyncAction) {
    let (marker, label) = match action.kind {
        SyncActionKind::Unchanged => return,
        SyncActionKind::Deployed => ("+".green(), "deployed".green()),
        SyncActionKind::WouldDeploy => ("~".blue(), "would deploy".blue()),
        SyncActionKind::RealDrifted => ("!".yellow(), "real drifted".yellow()),
        SyncActionKind::Conflict => ("!".red(), "conflict".red().bold()),
        SyncActionKind::Failed => ("x".red(), "failed".red()),
    };
    let path = repo_relative(workspace, &action.virtual_path);
    if action.detail.is_empty() {
        println!("   {} {} {}", marker, label, path.as_str().cyan());
    } else {
        println!(
            "   {} {} {} ({})",
            marker,
            label,
            path.as_str().cyan(),
            action.detail.as_str().dimmed()
        );
    }
}

fn print_summary(report: &SyncReport, dry_run: bool) {
    let deployed = if dry_run {
        report.count(SyncActionKind::WouldDeploy)
    } else {
        report.count(SyncActionKind::Deployed)
    };
    let summary = format!(
        "{} {}, {} unchanged, {} drifted, {} conflict(s), {} failed",
        deployed,
        if dry_run { "to deploy" } else { "deployed" },
        report.count(SyncActionKind::Unchanged),
        report.count(SyncActionKind::RealDrifted),
        report.count(SyncActionKind::Conflict),
        report.count(SyncActionKind::Failed),
    );

    println!();
    if report.problems() == 0 {
        println!("{} {}", "OK".green().bold(), summary);
    } else {
        println!("{} {}", "ATTENTION".yellow().bold(), summary);
        println!(
            "Resolve the listed files, then run {} and {} again.",
            "sysset lock".cyan(),
            "sysset sync".cyan()
        );
    }
}
