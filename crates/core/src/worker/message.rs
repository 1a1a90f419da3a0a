//! Request and response values exchanged between pages, worker and network.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use url::Url;

/// Freshness tag attached to stored responses: epoch milliseconds at write time.
pub const CACHE_TIME_HEADER: &str = "x-cache-time";

/// Body of the response synthesized when neither network nor cache can answer.
pub const OFFLINE_BODY: &str = "Video unavailable - please check your connection";

/// An intercepted page request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: None }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A response, either live from the network or read back from a store.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL after redirects, when known.
    pub url: Option<Url>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: HeaderMap::new(),
            body: body.into(),
            url: None,
        }
    }

    /// The 503 handed to pages when the network fails and nothing is cached.
    pub fn service_unavailable() -> Self {
        let mut response = Self::new(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_BODY);
        response.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parsed `X-Cache-Time` tag. `None` when absent or not an integer.
    pub fn cache_time(&self) -> Option<i64> {
        self.header(CACHE_TIME_HEADER).and_then(|v| v.trim().parse().ok())
    }

    /// Copy of this response tagged with `X-Cache-Time: millis`.
    pub fn with_cache_time(mut self, millis: i64) -> Self {
        self.headers
            .insert(HeaderName::from_static(CACHE_TIME_HEADER), HeaderValue::from(millis));
        self
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_time_roundtrip() {
        let response = Response::new(StatusCode::OK, "ok").with_cache_time(1_700_000_000_000);
        assert_eq!(response.header("X-Cache-Time"), Some("1700000000000"));
        assert_eq!(response.cache_time(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_cache_time_missing_or_garbage() {
        let mut response = Response::new(StatusCode::OK, "ok");
        assert_eq!(response.cache_time(), None);

        response
            .headers
            .insert(CACHE_TIME_HEADER, HeaderValue::from_static("yesterday"));
        assert_eq!(response.cache_time(), None);
    }

    #[test]
    fn test_with_cache_time_replaces_tag() {
        let response = Response::new(StatusCode::OK, "ok")
            .with_cache_time(1)
            .with_cache_time(2);
        assert_eq!(response.headers.get_all(CACHE_TIME_HEADER).iter().count(), 1);
        assert_eq!(response.cache_time(), Some(2));
    }

    #[test]
    fn test_service_unavailable() {
        let response = Response::service_unavailable();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status_text, "Service Unavailable");
        assert_eq!(response.text(), OFFLINE_BODY);
    }
}
