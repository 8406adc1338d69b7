//! `scenegen`: generate, validate and benchmark block-and-pipe scenes.

mod cli;
mod commands;
mod engine;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so scenes on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => {
            tokio::task::spawn_blocking(move || commands::generate::run(&args)).await?
        }
        Commands::Bench(args) => commands::bench::run(&args).await,
        Commands::Variants(args) => commands::variants::run(&args),
    }
}
