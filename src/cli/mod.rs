//! CLI for statusbot
//!
//! - run: boot the bot and poll until SIGINT/SIGTERM
//! - check-config: validate configuration without touching the network

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, RunArgs};
pub use commands::{check_config, run, run_bot};
pub use errors::{CliError, CliErrorCode, CliResult};
