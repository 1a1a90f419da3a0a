//! Named cache stores and their request → response entries.
//!
//! `CacheStorage` is the host-supplied cache API the worker runs against;
//! `CacheDb` implements it on SQLite. Each put/match/delete is a single
//! statement or transaction, so the worker needs no locking of its own.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;
use url::Url;

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::worker::{Request, Response};

/// Cache API a worker host provides.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it does not exist.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and all its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Look up the entry for a request's identity (method + URL).
    async fn match_request(&self, name: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Write an entry, replacing any prior entry for the same identity.
    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error>;
}

/// A stored row as it comes off disk.
struct EntryRow {
    response_url: Option<String>,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn into_response(self) -> Result<Response, Error> {
        let status = StatusCode::from_u16(self.status).map_err(|e| Error::CorruptRecord(e.to_string()))?;
        let headers = headers_from_json(&self.headers_json)?;
        let url = self
            .response_url
            .map(|u| Url::parse(&u).map_err(|e| Error::CorruptRecord(e.to_string())))
            .transpose()?;

        Ok(Response { status, status_text: self.status_text, headers, body: Bytes::from(self.body), url })
    }
}

/// Header values are kept as raw bytes; they need not be valid UTF-8.
fn headers_to_json(headers: &HeaderMap) -> Result<String, Error> {
    let pairs: Vec<(&str, &[u8])> = headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_bytes()))
        .collect();
    Ok(serde_json::to_string(&pairs)?)
}

fn headers_from_json(json: &str) -> Result<HeaderMap, Error> {
    let pairs: Vec<(String, Vec<u8>)> = serde_json::from_str(json)?;
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::CorruptRecord(e.to_string()))?;
        let value = HeaderValue::from_bytes(&value).map_err(|e| Error::CorruptRecord(e.to_string()))?;
        headers.append(name, value);
    }
    Ok(headers)
}

impl CacheDb {
    /// Create a store if absent. Opening an existing store is a no-op.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("store name cannot be empty".into()));
        }

        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List store names, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store; its entries go with it (ON DELETE CASCADE).
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Get the entry stored for `method` + `url`, if any.
    pub async fn match_entry(&self, name: &str, method: &str, url: &str) -> Result<Option<Response>, Error> {
        let name = name.to_string();
        let key = compute_request_key(method, url);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let row = conn
                    .query_row(
                        "SELECT response_url, status, status_text, headers_json, body
                         FROM cache_entries WHERE store_name = ?1 AND request_key = ?2",
                        params![name, key],
                        |row| {
                            Ok(EntryRow {
                                response_url: row.get(0)?,
                                status: row.get(1)?,
                                status_text: row.get(2)?,
                                headers_json: row.get(3)?,
                                body: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(Error::from)?;

        row.map(EntryRow::into_response).transpose()
    }

    /// Insert or replace the entry for `method` + `url`.
    ///
    /// Creates the store if needed. The `X-Cache-Time` header, when present
    /// and numeric, is mirrored into an indexed column for maintenance purges.
    pub async fn put_entry(&self, name: &str, method: &str, url: &str, response: &Response) -> Result<(), Error> {
        let name = name.to_string();
        let key = compute_request_key(method, url);
        let method = method.to_ascii_uppercase();
        let url = url.to_string();
        let response_url = response.url.as_ref().map(Url::to_string);
        let status = response.status.as_u16();
        let status_text = response.status_text.clone();
        let headers_json = headers_to_json(&response.headers)?;
        let body = response.body.to_vec();
        let cache_time = response.cache_time();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                tx.execute(
                    "INSERT INTO cache_entries (
                        store_name, request_key, method, url, response_url, status,
                        status_text, headers_json, body, cache_time, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT(store_name, request_key) DO UPDATE SET
                        response_url = excluded.response_url,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        cache_time = excluded.cache_time,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        key,
                        method,
                        url,
                        response_url,
                        status,
                        status_text,
                        headers_json,
                        body,
                        cache_time,
                        now
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a store.
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries whose freshness tag is missing or at least `window_ms` old.
    ///
    /// The worker never calls this; expired entries otherwise linger until
    /// overwritten so they stay available as offline fallbacks.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_entries(&self, name: &str, now_ms: i64, window_ms: i64) -> Result<u64, Error> {
        let name = name.to_string();
        let cutoff = now_ms - window_ms;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries
                     WHERE store_name = ?1 AND (cache_time IS NULL OR cache_time <= ?2)",
                    params![name, cutoff],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn match_request(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(name, request.method.as_str(), request.url.as_str()).await
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(name, request.method.as_str(), request.url.as_str(), response)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost:8080/").unwrap().join(path).unwrap())
    }

    fn tagged(body: &'static str, cache_time: i64) -> Response {
        Response::new(StatusCode::OK, body).with_cache_time(cache_time)
    }

    #[tokio::test]
    async fn test_open_store_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v1").await.unwrap();
        db.open_store("v1").await.unwrap();
        assert_eq!(db.store_names().await.unwrap(), vec!["v1"]);
    }

    #[tokio::test]
    async fn test_open_store_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(matches!(db.open_store(" ").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("styles.css");
        let mut response = tagged("body { color: teal }", 1_000);
        response
            .headers
            .insert(http::header::CONTENT_TYPE, HeaderValue::from_static("text/css"));
        response.url = Some(request.url.clone());

        db.put("v1", &request, &response).await.unwrap();

        let cached = db.match_request("v1", &request).await.unwrap().unwrap();
        assert_eq!(cached.status, StatusCode::OK);
        assert_eq!(cached.status_text, "OK");
        assert_eq!(cached.body, Bytes::from_static(b"body { color: teal }"));
        assert_eq!(cached.header("content-type"), Some("text/css"));
        assert_eq!(cached.cache_time(), Some(1_000));
        assert_eq!(cached.url, Some(request.url.clone()));
    }

    #[tokio::test]
    async fn test_non_utf8_header_bytes_preserved() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("Images/brochure.pdf");
        let raw = b"attachment; filename=\"caf\xe9.pdf\"";
        let mut response = tagged("%PDF", 1_000);
        response
            .headers
            .insert(http::header::CONTENT_DISPOSITION, HeaderValue::from_bytes(raw).unwrap());

        db.put("v1", &request, &response).await.unwrap();

        let cached = db.match_request("v1", &request).await.unwrap().unwrap();
        let value = cached.headers.get(http::header::CONTENT_DISPOSITION).unwrap();
        assert_eq!(value.as_bytes(), raw);
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v1").await.unwrap();
        assert!(db.match_request("v1", &page_request("missing.js")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_is_scoped_to_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("script.js");
        db.put("v1", &request, &tagged("v1", 1)).await.unwrap();

        assert!(db.match_request("v2", &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_distinguishes_method() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("gallery.html");
        db.put("v1", &request, &tagged("page", 1)).await.unwrap();

        let head = Request::new(http::Method::HEAD, request.url.clone());
        assert!(db.match_request("v1", &head).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_without_duplicates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("gallery.html");

        db.put("v1", &request, &tagged("old", 1_000)).await.unwrap();
        db.put("v1", &request, &tagged("new", 2_000)).await.unwrap();

        assert_eq!(db.entry_count("v1").await.unwrap(), 1);
        let cached = db.match_request("v1", &request).await.unwrap().unwrap();
        assert_eq!(cached.text(), "new");
        assert_eq!(cached.cache_time(), Some(2_000));
    }

    #[tokio::test]
    async fn test_delete_store_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = page_request("styles.css");
        db.put("v0", &request, &tagged("old", 1)).await.unwrap();
        db.put("v1", &request, &tagged("new", 1)).await.unwrap();

        assert!(db.delete_store("v0").await.unwrap());
        assert!(!db.delete_store("v0").await.unwrap());

        assert_eq!(db.store_names().await.unwrap(), vec!["v1"]);
        assert_eq!(db.entry_count("v0").await.unwrap(), 0);
        assert_eq!(db.entry_count("v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let window = 1_000;
        db.put("v1", &page_request("fresh.css"), &tagged("fresh", 9_500)).await.unwrap();
        db.put("v1", &page_request("edge.css"), &tagged("edge", 9_000)).await.unwrap();
        db.put("v1", &page_request("untagged.css"), &Response::new(StatusCode::OK, "untagged"))
            .await
            .unwrap();

        let deleted = db.purge_expired_entries("v1", 10_000, window).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(db.match_request("v1", &page_request("fresh.css")).await.unwrap().is_some());
    }
}
