//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--token <token>`: Forge API token (default: `GITHUB_TOKEN`)
//! - `--repo <owner/name>`: Target repository (default: `[repo]` in config)

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::forge::{MergeMethod, StateChange};

/// fgate - Pull request operations against a hosted Git forge
#[derive(Parser, Debug)]
#[command(name = "fgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (overrides FORGEGATE_CONFIG and default locations)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Forge API token; falls back to GITHUB_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Target repository as OWNER/NAME
    #[arg(long, global = true, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a pull request, retrying while the branch propagates
    #[command(after_help = "\
EXAMPLES:
    # Open a PR from feature/fix into the configured base branch
    fgate create --title \"Fix bug\" --head feature/fix

    # Open a draft PR against develop
    fgate create --title \"WIP\" --head feature/wip --base develop --draft")]
    Create {
        /// Pull request title
        #[arg(long)]
        title: String,

        /// Branch carrying the changes
        #[arg(long)]
        head: String,

        /// Pull request description
        #[arg(long, default_value = "")]
        body: String,

        /// Branch to merge into (default: configured base branch)
        #[arg(long)]
        base: Option<String>,

        /// Open as a draft
        #[arg(long)]
        draft: bool,
    },

    /// Show a pull request
    Get {
        /// Pull request number
        number: u64,
    },

    /// Merge a pull request
    Merge {
        /// Pull request number
        number: u64,

        /// Merge method
        #[arg(long, value_enum, default_value_t = MergeMethodArg::Merge)]
        method: MergeMethodArg,
    },

    /// Reopen a closed pull request
    Reopen {
        /// Pull request number
        number: u64,
    },

    /// Change a pull request's description, state, or base branch
    Update {
        /// Pull request number
        number: u64,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New state
        #[arg(long, value_enum)]
        state: Option<StateArg>,

        /// New base branch
        #[arg(long)]
        base: Option<String>,
    },
}

/// Merge method for merge command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethodArg {
    /// Create a merge commit
    Merge,
    /// Squash and merge
    Squash,
    /// Rebase and merge
    Rebase,
}

impl From<MergeMethodArg> for MergeMethod {
    fn from(arg: MergeMethodArg) -> Self {
        match arg {
            MergeMethodArg::Merge => MergeMethod::Merge,
            MergeMethodArg::Squash => MergeMethod::Squash,
            MergeMethodArg::Rebase => MergeMethod::Rebase,
        }
    }
}

/// Target state for update command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArg {
    Open,
    Closed,
}

impl From<StateArg> for StateChange {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Open => StateChange::Open,
            StateArg::Closed => StateChange::Closed,
        }
    }
}
