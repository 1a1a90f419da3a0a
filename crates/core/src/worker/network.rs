//! Live network access used by the worker.

use std::sync::Arc;

use async_trait::async_trait;

use super::message::{Request, Response};

/// The network rejected a fetch outright (offline, DNS, connection reset).
///
/// Non-success statuses are not errors: they come back as a `Response`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

#[async_trait]
impl<T: Network + ?Sized> Network for Arc<T> {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        (**self).fetch(request).await
    }
}
