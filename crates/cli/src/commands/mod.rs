//! Subcommand implementations.
//!
//! Each command returns a serializable output; `main` prints it.

use anyhow::{Context as _, Result};
use serde_json::Value;
use stagecraft_client::{FetchClient, FetchConfig};
use stagecraft_core::{AppConfig, CacheDb, ServiceWorker};

use crate::args::{Cli, Command};

pub mod forms;
pub mod videos;
pub mod worker;

/// The worker as hosted by this binary.
pub type HostedWorker = ServiceWorker<CacheDb, FetchClient>;

/// Loaded configuration and open database shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub db: CacheDb,
}

impl Context {
    pub async fn open(config: AppConfig) -> Result<Self> {
        let db = CacheDb::open(&config.db_path)
            .await
            .with_context(|| format!("failed to open cache database at {}", config.db_path.display()))?;
        Ok(Self { config, db })
    }

    pub fn network(&self) -> Result<FetchClient> {
        let fetch_config = FetchConfig { user_agent: self.config.user_agent.clone(), ..Default::default() };
        Ok(FetchClient::new(fetch_config)?)
    }

    /// A freshly parsed worker over this context's store.
    pub fn worker(&self) -> Result<HostedWorker> {
        let worker_config = self.config.worker_config()?;
        Ok(ServiceWorker::new(worker_config, self.db.clone(), self.network()?))
    }
}

pub async fn dispatch(cli: Cli) -> Result<Value> {
    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let ctx = Context::open(config).await?;

    let output = match cli.cmd {
        Command::Install => serde_json::to_value(worker::install_impl(&ctx).await?)?,
        Command::Activate => serde_json::to_value(worker::activate_impl(&ctx).await?)?,
        Command::Fetch(args) => serde_json::to_value(worker::fetch_impl(&ctx, &args).await?)?,
        Command::Run(args) => serde_json::to_value(worker::run_impl(&ctx, &args).await?)?,
        Command::Stores => serde_json::to_value(worker::stores_impl(&ctx).await?)?,
        Command::PurgeExpired => serde_json::to_value(worker::purge_expired_impl(&ctx).await?)?,
        Command::Book(args) => forms::book_impl(&ctx, args).await?,
        Command::Apply(args) => forms::apply_impl(&ctx, args).await?,
        Command::Videos(args) => serde_json::to_value(videos::videos_impl(&ctx, &args).await?)?,
    };

    Ok(output)
}
