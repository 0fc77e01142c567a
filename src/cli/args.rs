//! CLI argument definitions using clap
//!
//! Commands:
//! - statusbot [run] [--env-file <path>] [--once]
//! - statusbot check-config [--env-file <path>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// statusbot - game server status relay for Discord
#[derive(Parser, Debug)]
#[command(name = "statusbot")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default)
    Run(RunArgs),

    /// Validate configuration and print a redacted summary
    CheckConfig {
        /// Env file to read (default: ./.env when present)
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Env file to read (default: ./.env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The command to run, `run` when none was given
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}
