use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use gitlab_enforcer::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if args.command == cli::Command::Version {
        commands::version::run();
        return Ok(());
    }

    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));

    match args.command {
        cli::Command::Sync => commands::sync::run(&args.global, &log),
        cli::Command::Validate => commands::validate::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    }
}
