//! Install and activate handlers.
//!
//! Install opens the current store and pre-populates it from the manifest;
//! a manifest URL that cannot be fetched is logged and skipped. Activate
//! deletes every store whose name is not the current version identifier.

use serde::Serialize;
use url::Url;

use super::clock::Clock;
use super::host::WorkerHost;
use super::message::Request;
use super::network::Network;
use super::{ServiceWorker, WorkerState};
use crate::Error;
use crate::cache::CacheStorage;

/// What install managed to pre-populate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    pub cached: Vec<String>,
    pub failed: Vec<ManifestFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestFailure {
    pub url: String,
    pub reason: String,
}

/// Stores retired by activation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivateReport {
    pub cache_name: String,
    pub deleted: Vec<String>,
}

impl<S, N, C, H> ServiceWorker<S, N, C, H>
where
    S: CacheStorage,
    N: Network,
    C: Clock,
    H: WorkerHost,
{
    /// Open the current store and pre-populate it from the manifest.
    ///
    /// Manifest entries are stored as fetched, without a freshness tag, so
    /// the first page fetch of each one still goes to the network; they
    /// serve as offline fallbacks until then.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the worker is `Parsed`.
    /// Store and network failures never fail the install.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition("install", WorkerState::Parsed, WorkerState::Installing)
            .await?;

        let cache_name = &self.config.cache_name;
        let mut report = InstallReport { cache_name: cache_name.clone(), ..Default::default() };

        if let Err(e) = self.storage.open(cache_name).await {
            tracing::warn!(%cache_name, error = %e, "cache installation error: failed to open store");
        }

        for url in &self.config.manifest {
            match self.precache(url).await {
                Ok(()) => report.cached.push(url.to_string()),
                Err(e) => {
                    tracing::warn!(%url, error = %e, "cache installation error");
                    report.failed.push(ManifestFailure { url: url.to_string(), reason: e.to_string() });
                }
            }
        }

        self.transition("install", WorkerState::Installing, WorkerState::Installed)
            .await?;
        self.host.skip_waiting();

        tracing::info!(
            %cache_name,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "worker installed"
        );

        Ok(report)
    }

    async fn precache(&self, url: &Url) -> Result<(), Error> {
        let request = Request::get(url.clone());
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status.is_success() {
            return Err(Error::Network(format!("{url} responded with status {}", response.status.as_u16())));
        }

        self.storage
            .put(&self.config.cache_name, &request, &response)
            .await
    }

    /// Delete every store not named by the current version identifier,
    /// then claim all open clients.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the worker is `Installed`.
    /// A store that cannot be listed or deleted is logged and left behind.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition("activate", WorkerState::Installed, WorkerState::Activating)
            .await?;

        let cache_name = &self.config.cache_name;
        let mut report = ActivateReport { cache_name: cache_name.clone(), ..Default::default() };

        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stores; stale stores left in place");
                Vec::new()
            }
        };

        for name in names.into_iter().filter(|name| name != cache_name) {
            match self.storage.delete(&name).await {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted stale store");
                    report.deleted.push(name);
                }
                Err(e) => tracing::warn!(store = %name, error = %e, "failed to delete stale store"),
            }
        }

        self.transition("activate", WorkerState::Activating, WorkerState::Activated)
            .await?;
        self.host.claim_clients();

        Ok(report)
    }

    /// Take over as the already-activated generation, without re-running
    /// install or activate.
    ///
    /// For a host restarting a generation it activated earlier; the store
    /// is used as it stands.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the worker is `Parsed`.
    pub async fn resume(&self) -> Result<(), Error> {
        self.transition("resume", WorkerState::Parsed, WorkerState::Activated)
            .await?;
        self.host.claim_clients();
        Ok(())
    }
}
