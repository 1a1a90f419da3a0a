//! SQLite-backed storage for the cache worker.
//!
//! This module provides the host side of the worker's cache API using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named, versioned stores of request → response entries
//! - Request identity keys hashed with SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - A small key/value table for page-side bookkeeping

pub mod connection;
pub mod hash;
pub mod kv;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use storage::CacheStorage;
