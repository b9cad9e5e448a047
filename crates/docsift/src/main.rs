mod cli;
mod display;
mod scan;

use anyhow::Result;
use clap::Parser;

use docsift_core::PipelineVariant;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lease(args) => scan::run(PipelineVariant::Lease, args).await,
        Commands::Pii(args) => scan::run(PipelineVariant::Pii, args).await,
    }
}
