//! Cache-first fetch interception with a fixed freshness window.
//!
//! For an intercepted GET:
//! 1. Look up the stored entry for the request.
//! 2. [`decide`] classifies it. A fresh entry is returned without touching
//!    the network.
//! 3. Otherwise the network answers. A same-origin 200 is stored with a new
//!    `X-Cache-Time` tag; the caller gets the untagged live response.
//! 4. If the network rejects the fetch, the entry from step 1 is served
//!    whatever its age, or a synthesized 503 when there is none.
//!
//! Expired entries are bypassed, never deleted, so step 4 still has
//! something to serve offline.

use std::time::Duration;

use http::{Method, StatusCode};
use serde::Serialize;

use super::clock::Clock;
use super::host::WorkerHost;
use super::message::{Request, Response};
use super::network::Network;
use super::{ServiceWorker, WorkerState};
use crate::Error;
use crate::cache::CacheStorage;
use crate::origin::is_same_origin;

/// Entries younger than this are served without a network call.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(72 * 60 * 60);

const FRESHNESS_WINDOW_MS: i64 = FRESHNESS_WINDOW.as_millis() as i64;

/// How a store lookup steers the rest of the fetch.
#[derive(Debug)]
pub enum CacheDecision {
    /// Tagged and younger than [`FRESHNESS_WINDOW`]: answer from the store.
    Fresh(Response),
    /// Go to the network; keep the entry, if any, as the offline fallback.
    StaleOrMissing(Option<Response>),
    /// The store could not be consulted; only the network can answer.
    NetworkOnly,
}

/// Classify a store lookup made at `now_ms`.
///
/// An entry without a parsable `X-Cache-Time` tag is treated as stale.
pub fn decide(lookup: Result<Option<Response>, Error>, now_ms: i64) -> CacheDecision {
    match lookup {
        Err(e) => {
            tracing::warn!(error = %e, "cache lookup failed");
            CacheDecision::NetworkOnly
        }
        Ok(None) => CacheDecision::StaleOrMissing(None),
        Ok(Some(entry)) => match entry.cache_time() {
            Some(stored_at) => match now_ms.checked_sub(stored_at) {
                Some(age) if age < FRESHNESS_WINDOW_MS => CacheDecision::Fresh(entry),
                _ => CacheDecision::StaleOrMissing(Some(entry)),
            },
            None => CacheDecision::StaleOrMissing(Some(entry)),
        },
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    StaleFallback,
    Synthesized,
}

#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

/// Outcome of offering a request to the worker.
#[derive(Debug)]
pub enum Intercept {
    /// Not intercepted; the host performs the request itself.
    Passthrough(Request),
    Respond(Served),
}

impl Intercept {
    /// The served response, if the worker answered.
    pub fn served(self) -> Option<Served> {
        match self {
            Intercept::Respond(served) => Some(served),
            Intercept::Passthrough(_) => None,
        }
    }
}

impl<S, N, C, H> ServiceWorker<S, N, C, H>
where
    S: CacheStorage,
    N: Network,
    C: Clock,
    H: WorkerHost,
{
    /// Answer a page request cache-first.
    ///
    /// Non-GET requests, and every request before activation, pass through
    /// untouched with no store or network I/O.
    pub async fn handle_fetch(&self, request: Request) -> Intercept {
        if request.method != Method::GET {
            return Intercept::Passthrough(request);
        }

        let state = self.state().await;
        if state != WorkerState::Activated {
            tracing::debug!(url = %request.url, %state, "worker not active; passing through");
            return Intercept::Passthrough(request);
        }

        let cache_name = &self.config.cache_name;
        let lookup = self.storage.match_request(cache_name, &request).await;

        let fallback = match decide(lookup, self.clock.now_millis()) {
            CacheDecision::Fresh(entry) => {
                tracing::debug!(url = %request.url, "cache hit");
                return Intercept::Respond(Served { response: entry, source: ResponseSource::Cache });
            }
            CacheDecision::StaleOrMissing(entry) => entry,
            CacheDecision::NetworkOnly => None,
        };

        match self.network.fetch(&request).await {
            Ok(response) => {
                self.store_if_cacheable(&request, &response).await;
                Intercept::Respond(Served { response, source: ResponseSource::Network })
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "network fetch failed");
                let served = match fallback {
                    Some(entry) => Served { response: entry, source: ResponseSource::StaleFallback },
                    None => Served { response: Response::service_unavailable(), source: ResponseSource::Synthesized },
                };
                Intercept::Respond(served)
            }
        }
    }

    /// Store a tagged copy of a same-origin 200; anything else is left alone.
    async fn store_if_cacheable(&self, request: &Request, response: &Response) {
        if response.status != StatusCode::OK {
            return;
        }

        let scope = &self.config.scope;
        let same_origin = is_same_origin(scope, &request.url)
            && response.url.as_ref().is_none_or(|final_url| is_same_origin(scope, final_url));
        if !same_origin {
            tracing::debug!(url = %request.url, "cross-origin response not cached");
            return;
        }

        let tagged = response.clone().with_cache_time(self.clock.now_millis());
        if let Err(e) = self.storage.put(&self.config.cache_name, request, &tagged).await {
            tracing::warn!(url = %request.url, error = %e, "failed to store response");
        }
    }
}
