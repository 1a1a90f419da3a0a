//! stagecraft command-line host.
//!
//! Drives the cache worker against a local SQLite store and submits the
//! site's forms. Results go to stdout as JSON; logs go to stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let output = commands::dispatch(cli).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
