//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the GitLab settings enforcer.
#[derive(Parser, Debug)]
#[command(
    name = "gitlab-enforcer",
    about = "Enforce branch protection and project settings across a GitLab group",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Config file (defaults to $GITLAB_ENFORCER_CONFIG, then ./gitlab-enforcer.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GitLab base URL (overrides $GITLAB_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sync every project's settings with the config
    Sync,
    /// Load and validate the config without contacting GitLab
    Validate,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Validate => "validate",
            Self::Version => "version",
        }
    }
}
