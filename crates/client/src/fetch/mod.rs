//! HTTP network for the cache worker.
//!
//! ### Behaviour
//! - Forwards method, URL, headers and body of the intercepted request.
//! - Any HTTP status is a response; only transport failures are errors.
//! - No request timeout: a hung request stays pending, only outright
//!   rejection reaches the worker's offline fallback.
//! - Max redirects: 5. The final URL is reported so the worker can refuse
//!   to store responses redirected off-origin.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use stagecraft_core::Error;
use stagecraft_core::worker::{Network, NetworkError, Request, Response};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "stagecraft/0.1")
    pub user_agent: String,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "stagecraft/0.1".to_string(), max_redirects: 5 }
    }
}

/// reqwest-backed [`Network`].
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Send a request and read the full response body.
    pub async fn send(&self, request: &Request) -> Result<Response, NetworkError> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| NetworkError::Unreachable {
            url: request.url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();

        let body = response.bytes().await.map_err(|e| NetworkError::Body {
            url: request.url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            "fetched {} {} -> {} ({}) in {}ms ({} bytes)",
            request.method,
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        let mut out = Response::new(status, body);
        out.headers = headers;
        out.url = Some(final_url);
        Ok(out)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.send(request).await
    }
}
