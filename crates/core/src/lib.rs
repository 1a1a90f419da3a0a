//! Core types and shared functionality for stagecraft.
//!
//! This crate provides:
//! - Cache storage with SQLite backend (named, versioned stores)
//! - The cache worker: lifecycle manager and cache-first fetch interceptor
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod origin;
pub mod worker;

pub use cache::{CacheDb, CacheStorage};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use worker::{Request, Response, ServiceWorker, WorkerConfig};
