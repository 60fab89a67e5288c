mod auth;
mod cache;
mod cli;
mod codec;
mod error;
mod intervals;
mod models;
mod providers;
mod ttl;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting BuildLens - Buildkite build listing tool");
    cli.execute().await?;

    Ok(())
}
