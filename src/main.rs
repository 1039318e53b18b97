mod cli;
mod config;
mod error;
mod output;
mod pulumi;
mod stack;
mod storage;
mod teardown;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .without_time()
        .init();

    let config = config::WorkspaceConfig::load(&cli.config)?;

    match cli.command {
        Command::Destroy(args) => {
            cli::destroy::run(config, args).await?;
        }

        Command::Resolve { stack, json } => {
            cli::resolve::run(&config, &stack, json)?;
        }
    }

    Ok(())
}
