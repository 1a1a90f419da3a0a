//! Worker lifecycle and store maintenance commands.

use anyhow::{Result, bail};
use http::Method;
use serde::Serialize;
use stagecraft_core::origin;
use stagecraft_core::worker::{
    ActivateReport, Clock, FRESHNESS_WINDOW, InstallReport, Intercept, Request, ResponseSource, SystemClock,
};

use super::{Context, HostedWorker};
use crate::args::FetchArgs;

/// Key recording the store generation this database last activated.
pub const ACTIVE_GENERATION_KEY: &str = "stagecraft_active_generation";

#[derive(Debug, Serialize)]
pub struct ActivateOutput {
    pub install: InstallReport,
    pub activate: ActivateReport,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    /// Where the response came from; `None` when the host performed the request itself.
    pub source: Option<ResponseSource>,
    pub cache_time: Option<i64>,
    pub content_type: Option<String>,
    pub bytes: usize,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// Present only when this invocation installed the generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<ActivateReport>,
    pub fetches: Vec<FetchOutput>,
}

#[derive(Debug, Serialize)]
pub struct StoreInfo {
    pub name: String,
    pub entries: u64,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct PurgeOutput {
    pub cache_name: String,
    pub deleted: u64,
}

pub async fn install_impl(ctx: &Context) -> Result<InstallReport> {
    Ok(ctx.worker()?.install().await?)
}

pub async fn activate_impl(ctx: &Context) -> Result<ActivateOutput> {
    activate_and_record(ctx, &ctx.worker()?).await
}

async fn activate_and_record(ctx: &Context, worker: &HostedWorker) -> Result<ActivateOutput> {
    let (install, activate) = worker.start().await?;
    ctx.db
        .kv_set(ACTIVE_GENERATION_KEY, &activate.cache_name)
        .await?;
    Ok(ActivateOutput { install, activate })
}

/// Resume the generation an earlier invocation activated, or install and
/// activate it. Returns the reports only when the lifecycle ran.
async fn ensure_active(ctx: &Context, worker: &HostedWorker) -> Result<Option<ActivateOutput>> {
    let cache_name = &worker.config().cache_name;
    let recorded = ctx.db.kv_get(ACTIVE_GENERATION_KEY).await?;

    if recorded.as_deref() == Some(cache_name.as_str()) && ctx.db.store_names().await?.contains(cache_name) {
        tracing::debug!(%cache_name, "resuming active generation");
        worker.resume().await?;
        return Ok(None);
    }

    activate_and_record(ctx, worker).await.map(Some)
}

pub async fn fetch_impl(ctx: &Context, args: &FetchArgs) -> Result<Vec<FetchOutput>> {
    Ok(run_impl(ctx, args).await?.fetches)
}

pub async fn run_impl(ctx: &Context, args: &FetchArgs) -> Result<RunOutput> {
    let method = parse_method(&args.method)?;
    let worker = ctx.worker()?;
    let (install, activate) = match ensure_active(ctx, &worker).await? {
        Some(ActivateOutput { install, activate }) => (Some(install), Some(activate)),
        None => (None, None),
    };

    let mut fetches = Vec::with_capacity(args.urls.len());
    for url in &args.urls {
        fetches.push(fetch_one(ctx, &worker, method.clone(), url, args.body).await?);
    }

    Ok(RunOutput { install, activate, fetches })
}

async fn fetch_one(
    ctx: &Context, worker: &HostedWorker, method: Method, url: &str, with_body: bool,
) -> Result<FetchOutput> {
    let url = origin::resolve(&worker.config().scope, url)?;
    let request = Request::new(method.clone(), url.clone());

    let (response, source) = match worker.handle_fetch(request).await {
        Intercept::Respond(served) => (served.response, Some(served.source)),
        Intercept::Passthrough(request) => (ctx.network()?.send(&request).await?, None),
    };

    tracing::info!(%url, status = response.status.as_u16(), ?source, "fetched");

    Ok(FetchOutput {
        url: url.to_string(),
        method: method.to_string(),
        status: response.status.as_u16(),
        status_text: response.status_text.clone(),
        source,
        cache_time: response.cache_time(),
        content_type: response.header("content-type").map(str::to_string),
        bytes: response.body.len(),
        body: with_body.then(|| response.text()),
    })
}

fn parse_method(raw: &str) -> Result<Method> {
    let method = Method::from_bytes(raw.to_ascii_uppercase().as_bytes())?;
    if method == Method::CONNECT {
        bail!("unsupported method: {raw}");
    }
    Ok(method)
}

pub async fn stores_impl(ctx: &Context) -> Result<Vec<StoreInfo>> {
    let mut stores = Vec::new();
    for name in ctx.db.store_names().await? {
        let entries = ctx.db.entry_count(&name).await?;
        let current = name == ctx.config.cache_name;
        stores.push(StoreInfo { name, entries, current });
    }
    Ok(stores)
}

/// Remove entries of the current store that are untagged or older than the freshness window.
pub async fn purge_expired_impl(ctx: &Context) -> Result<PurgeOutput> {
    purge_expired_at(ctx, SystemClock.now_millis()).await
}

async fn purge_expired_at(ctx: &Context, now_ms: i64) -> Result<PurgeOutput> {
    let cache_name = ctx.config.cache_name.clone();
    let window_ms = i64::try_from(FRESHNESS_WINDOW.as_millis())?;
    let deleted = ctx
        .db
        .purge_expired_entries(&cache_name, now_ms, window_ms)
        .await?;
    tracing::info!(%cache_name, deleted, "purged expired entries");
    Ok(PurgeOutput { cache_name, deleted })
}
