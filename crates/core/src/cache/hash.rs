//! Request identity keys.

use sha2::{Digest, Sha256};

/// Compute the store key for a request: method plus URL.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let key1 = compute_request_key("GET", "http://localhost:8080/styles.css");
        let key2 = compute_request_key("GET", "http://localhost:8080/styles.css");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_method_case_insensitive() {
        let upper = compute_request_key("GET", "http://localhost:8080/");
        let lower = compute_request_key("get", "http://localhost:8080/");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_key_different_method() {
        let get = compute_request_key("GET", "http://localhost:8080/");
        let head = compute_request_key("HEAD", "http://localhost:8080/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_key_format() {
        let key = compute_request_key("GET", "http://localhost:8080/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
