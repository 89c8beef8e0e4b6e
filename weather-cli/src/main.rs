//! Binary crate for the `weather-news` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and permission prompts
//! - Rendering the weather & news screen as text

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod prompt;
mod render;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };

    // Logs go to stderr so the rendered screen on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}
