//! The cache worker: a versioned store, its lifecycle, and cache-first
//! fetch interception with a fixed freshness window.
//!
//! A worker generation moves through
//! `Parsed → Installing → Installed → Activating → Activated`. Only an
//! activated worker answers fetches; until then every request passes
//! through to the network untouched. A new generation (new `cache_name`)
//! runs the same machine and retires older stores when it activates.
//!
//! Host wiring is kept behind traits: [`CacheStorage`] for stores,
//! [`Network`] for live fetches, [`Clock`] for freshness tags and
//! [`WorkerHost`] for the skip-waiting / claim-clients hooks.

pub mod clock;
pub mod host;
pub mod interceptor;
pub mod lifecycle;
pub mod message;
pub mod network;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::Error;
use crate::cache::CacheStorage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use host::{LoggingHost, WorkerHost};
pub use interceptor::{CacheDecision, FRESHNESS_WINDOW, Intercept, ResponseSource, Served, decide};
pub use lifecycle::{ActivateReport, InstallReport, ManifestFailure};
pub use message::{CACHE_TIME_HEADER, OFFLINE_BODY, Request, Response};
pub use network::{Network, NetworkError};

/// Per-generation worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of the current store; every other store is stale.
    pub cache_name: String,
    /// Origin the worker serves. Only same-origin responses are stored.
    pub scope: Url,
    /// Absolute URLs pre-populated at install.
    pub manifest: Vec<Url>,
}

/// Lifecycle position of a worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        };
        f.write_str(name)
    }
}

/// Events a host delivers to the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
}

/// Result of handling one [`WorkerEvent`].
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(Intercept),
}

/// One worker generation bound to its host services.
pub struct ServiceWorker<S, N, C = SystemClock, H = LoggingHost> {
    config: WorkerConfig,
    storage: S,
    network: N,
    clock: C,
    host: H,
    state: RwLock<WorkerState>,
}

impl<S: CacheStorage, N: Network> ServiceWorker<S, N> {
    pub fn new(config: WorkerConfig, storage: S, network: N) -> Self {
        Self {
            config,
            storage,
            network,
            clock: SystemClock,
            host: LoggingHost,
            state: RwLock::new(WorkerState::Parsed),
        }
    }
}

impl<S, N, C, H> ServiceWorker<S, N, C, H> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ServiceWorker<S, N, C2, H> {
        ServiceWorker {
            config: self.config,
            storage: self.storage,
            network: self.network,
            clock,
            host: self.host,
            state: RwLock::new(self.state.into_inner()),
        }
    }

    pub fn with_host<H2: WorkerHost>(self, host: H2) -> ServiceWorker<S, N, C, H2> {
        ServiceWorker {
            config: self.config,
            storage: self.storage,
            network: self.network,
            clock: self.clock,
            host,
            state: RwLock::new(self.state.into_inner()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Move from `from` to `to`, rejecting the event in any other state.
    async fn transition(&self, event: &'static str, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidTransition { event, state: state.to_string() });
        }
        tracing::info!(cache_name = %self.config.cache_name, %from, %to, "worker state change");
        *state = to;
        Ok(())
    }
}

impl<S, N, C, H> ServiceWorker<S, N, C, H>
where
    S: CacheStorage,
    N: Network,
    C: Clock,
    H: WorkerHost,
{
    /// Handle one host event.
    ///
    /// # Errors
    ///
    /// Only lifecycle events delivered out of order fail; fetches always
    /// resolve to an [`Intercept`].
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetched(self.handle_fetch(request).await)),
        }
    }

    /// Install then activate, as a host does for a freshly registered worker.
    pub async fn start(&self) -> Result<(InstallReport, ActivateReport), Error> {
        let installed = self.install().await?;
        let activated = self.activate().await?;
        Ok((installed, activated))
    }
}
