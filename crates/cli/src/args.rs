use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stagecraft", version, about = "Offline cache worker and form client for the Stagecraft site")]
pub struct Cli {
    /// SQLite database path (overrides STAGECRAFT_DB_PATH).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the current store and pre-populate it from the manifest
    Install,
    /// Install, then delete every store not named by the current version
    Activate,
    /// Fetch URLs through the active worker, installing it first if needed
    Fetch(FetchArgs),
    /// Fetch URLs, also reporting install and activation when they ran
    Run(FetchArgs),
    /// List stores and their entry counts
    Stores,
    /// Delete expired or untagged entries from the current store
    PurgeExpired,
    /// Submit a book-an-artist request
    Book(BookArgs),
    /// Submit an artist application
    Apply(ApplyArgs),
    /// Seed the video annotations and mark embedded players
    Videos(VideosArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URLs to fetch, absolute or relative to the configured origin
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Include response bodies in the output
    #[arg(long)]
    pub body: bool,
}

#[derive(Args, Debug)]
pub struct BookArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Event location
    #[arg(long)]
    pub location: String,

    /// Genre, repeatable
    #[arg(long = "genre")]
    pub genres: Vec<String>,

    /// Language, repeatable
    #[arg(long = "language")]
    pub languages: Vec<String>,

    /// Validate and print the payload without submitting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Form field as name=value, repeatable and kept in order
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Bangalore location, repeatable
    #[arg(long = "location")]
    pub locations: Vec<String>,

    /// Validate and print the payload without submitting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct VideosArgs {
    /// Player URLs seen on the page (https://www.youtube.com/embed/<id>)
    pub embeds: Vec<String>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))?;
    if name.trim().is_empty() {
        return Err(format!("field name missing in {raw:?}"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}
