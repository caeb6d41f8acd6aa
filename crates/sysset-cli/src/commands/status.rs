//! Status command implementation

use colored::Colorize;
use sysset_core::{PairReport, StatusOutcome, Verdict, Workspace};

use super::repo_relative;
use crate::error::Result;

/// Run the status command
///
/// Returns `different + missing + error`.
pub fn run_status(workspace: &Workspace, json: bool, persist_prune: bool) -> Result<usize> {
    let outcome = workspace.status(persist_prune)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(workspace, &outcome);
    }

    Ok(outcome.report.counts.problems())
}

fn print_outcome(workspace: &Workspace, outcome: &StatusOutcome) {
    let report = &outcome.report;
    if report.pairs.is_empty() {
        println!("{} No tracked files under {}", "=>".blue().bold(), workspace.root());
        return;
    }

    for pair in &report.pairs {
        print_pair(workspace, pair);
    }

    if !outcome.pruned.is_empty() {
        println!();
        let note = if outcome.persisted {
            "removed from lockfile"
        } else {
            "ignored (use --persist-prune to drop them)"
        };
        println!(
            "{} {} stale lockfile entr{} {}",
            "!".yellow(),
            outcome.pruned.len(),
            if outcome.pruned.len() == 1 { "y" } else { "ies" },
            note
        );
        for entry in &outcome.pruned {
            println!("   {} {}", "-".yellow(), entry.path.as_str().dimmed());
        }
    }

    let counts = &report.counts;
    println!();
    let summary = format!(
        "{} same, {} different, {} missing, {} error",
        counts.same, counts.different, counts.missing, counts.errors
    );
    if report.is_clean() {
        println!("{} {}", "OK".green().bold(), summary);
    } else {
        println!("{} {}", "DRIFT".red().bold(), summary);
    }
}

fn print_pair(workspace: &Workspace, pair: &PairReport) {
    let padded = format!("{:>9}", pair.verdict.to_string());
    let label = match pair.verdict {
        Verdict::Same => padded.as_str().green(),
        Verdict::Different => padded.as_str().red().bold(),
        Verdict::Missing => padded.as_str().yellow().bold(),
        Verdict::Error => padded.as_str().red(),
    };
    let line = format!(
        "{}  {} -> {}",
        label,
        repo_relative(workspace, &pair.virtual_path).as_str().cyan(),
        pair.real_path
    );
    if pair.detail.is_empty() {
        println!("{line}");
    } else {
        println!("{line} ({})", pair.detail.dimmed());
    }
}
