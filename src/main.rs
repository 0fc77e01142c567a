//! statusbot entry point
//!
//! Parses arguments, hands off to the CLI module, and turns an error into
//! exit code 1.

use statusbot::cli::{self, Cli};

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run(Cli::parse_args()).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
