//! Test doubles for worker host services.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use super::host::WorkerHost;
use super::message::{Request, Response};
use super::network::{Network, NetworkError};
use super::WorkerConfig;

pub const SCOPE: &str = "http://localhost:8080/";

pub fn scope_url(path: &str) -> Url {
    Url::parse(SCOPE).unwrap().join(path).unwrap()
}

pub fn worker_config(cache_name: &str) -> WorkerConfig {
    WorkerConfig {
        cache_name: cache_name.to_string(),
        scope: Url::parse(SCOPE).unwrap(),
        manifest: ["gallery.html", "styles.css", "script.js", "Images/logo.png"]
            .into_iter()
            .map(scope_url)
            .collect(),
    }
}

enum Scripted {
    Respond(StatusCode, String),
    Fail,
}

/// Network answering from a fixed script; unscripted URLs are unreachable.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Scripted>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    /// Every default manifest URL answers 200.
    pub fn serving_manifest() -> Self {
        let network = Self::default();
        for url in worker_config("unused").manifest {
            network.respond(url.as_str(), StatusCode::OK, &format!("contents of {}", url.path()));
        }
        network
    }

    pub fn respond(&self, url: &str, status: StatusCode, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Respond(status, body.to_string()));
    }

    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Scripted::Fail);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        let unreachable = |reason: &str| NetworkError::Unreachable { url: url.clone(), reason: reason.to_string() };
        if self.offline.load(Ordering::SeqCst) {
            return Err(unreachable("offline"));
        }

        match self.routes.lock().unwrap().get(&url) {
            Some(Scripted::Respond(status, body)) => {
                let mut response = Response::new(*status, body.clone());
                response.url = Some(request.url.clone());
                Ok(response)
            }
            Some(Scripted::Fail) => Err(unreachable("connection reset")),
            None => Err(unreachable("dns lookup failed")),
        }
    }
}

#[derive(Default)]
pub struct RecordingHost {
    skipped: AtomicBool,
    claimed: AtomicBool,
}

impl RecordingHost {
    pub fn skipped_waiting(&self) -> bool {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn claimed_clients(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

impl WorkerHost for RecordingHost {
    fn skip_waiting(&self) {
        self.skipped.store(true, Ordering::SeqCst);
    }

    fn claim_clients(&self) {
        self.claimed.store(true, Ordering::SeqCst);
    }
}
