//! sysset CLI
//!
//! Deploys a dotfile repository onto the system and reports drift between
//! the two using the lockfile under `.sysset/`.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use sysset_core::Workspace;
use sysset_fs::NormalizedPath;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(problems) => std::process::exit(exit_code(problems)),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Problem counts are reported through the exit status, clamped to a byte.
fn exit_code(problems: usize) -> i32 {
    problems.min(255) as i32
}

fn run() -> Result<usize> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: cannot install logger: {}", "warning".yellow().bold(), e);
    }

    let root = resolve_root(cli.root.clone())?;
    tracing::debug!(root = %root.display(), "repository root");
    let workspace = Workspace::open(NormalizedPath::new(&root), &cli.settings.to_layer())?;

    execute_command(&workspace, cli.command)
}

fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit {
        Some(root) if !root.is_dir() => {
            return Err(CliError::user(format!(
                "repository root {} is not a directory",
                root.display()
            )));
        }
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir()?;
            context::detect_root(&cwd).ok_or_else(|| {
                CliError::user(format!(
                    "no sysset repository found at or above {} (looked for sysset.toml or .git)",
                    cwd.display()
                ))
            })?
        }
    };
    // lockfile keys are absolute
    Ok(dunce::canonicalize(&root)?)
}

fn execute_command(workspace: &Workspace, cmd: Commands) -> Result<usize> {
    match cmd {
        Commands::Status {
            json,
            persist_prune,
        } => commands::run_status(workspace, json, persist_prune),
        Commands::Lock => commands::run_lock(workspace),
        Commands::Verify => commands::run_verify(workspace),
        Commands::Set { dry } => commands::run_set(workspace, dry),
        Commands::Sync { dry } => commands::run_sync(workspace, dry),
    }
}
