//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sysset_core::{Platform, SettingsLayer};

/// sysset - deploy a dotfile repository and detect drift
#[derive(Parser, Debug)]
#[command(name = "sysset")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository root (default: nearest directory with sysset.toml or .git)
    #[arg(long, global = true, env = "SYSSET_ROOT")]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override configuration files and the environment
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// User whose home directory `home/` maps to
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Prefix every real path is placed under
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Target platform (darwin or linux)
    #[arg(long, global = true)]
    pub platform: Option<Platform>,

    /// Worker threads used for hashing
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Per-file read timeout in milliseconds, 0 disables it
    #[arg(long, global = true)]
    pub read_timeout_ms: Option<u64>,
}

impl SettingsArgs {
    pub fn to_layer(&self) -> SettingsLayer {
        SettingsLayer {
            user: self.user.clone(),
            prefix: self.prefix.clone(),
            platform: self.platform,
            read_timeout_ms: self.read_timeout_ms,
            threads: self.threads,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compare every virtual file with its real counterpart
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Write the lockfile back when stale entries were dropped
        #[arg(long)]
        persist_prune: bool,
    },

    /// Fingerprint both sides and rewrite the lockfile
    Lock,

    /// Check the lockfile covers every tracked file
    Verify,

    /// Copy every virtual file to its real location
    Set {
        /// Preview without writing
        #[arg(long)]
        dry: bool,
    },

    /// Deploy virtual-side changes the lockfile proves safe
    Sync {
        /// Preview without writing
        #[arg(long)]
        dry: bool,
    },
}
