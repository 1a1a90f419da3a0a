//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STAGECRAFT_*)
//! 2. TOML config file (if STAGECRAFT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::origin;
use crate::worker::WorkerConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STAGECRAFT_*)
/// 2. TOML config file (if STAGECRAFT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version identifier of the current cache store.
    ///
    /// Changing it is the only way to invalidate every stored entry.
    /// Set via STAGECRAFT_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin of the site the worker serves (scheme, host, port).
    ///
    /// Set via STAGECRAFT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Resources pre-populated at install time, relative to `origin`.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via STAGECRAFT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via STAGECRAFT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Form backend endpoint for "book an artist" requests.
    #[serde(default = "default_book_form_endpoint")]
    pub book_form_endpoint: String,

    /// Form backend endpoint for artist applications.
    #[serde(default = "default_apply_form_endpoint")]
    pub apply_form_endpoint: String,
}

fn default_cache_name() -> String {
    "stagecraft-gallery-v1".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_manifest() -> Vec<String> {
    vec![
        "gallery.html".into(),
        "styles.css".into(),
        "script.js".into(),
        "Images/logo.png".into(),
    ]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./stagecraft-cache.sqlite")
}

fn default_user_agent() -> String {
    "stagecraft/0.1".into()
}

fn default_book_form_endpoint() -> String {
    "https://formspree.io/f/mbdgkpnw".into()
}

fn default_apply_form_endpoint() -> String {
    "https://formspree.io/f/mjgyojvd".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            origin: default_origin(),
            manifest: default_manifest(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            book_form_endpoint: default_book_form_endpoint(),
            apply_form_endpoint: default_apply_form_endpoint(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STAGECRAFT_`
    /// 2. TOML file from `STAGECRAFT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment `load` extracts from.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STAGECRAFT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("STAGECRAFT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Build the worker configuration: parsed scope and resolved manifest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or a manifest entry does
    /// not resolve to a same-origin http(s) URL.
    pub fn worker_config(&self) -> Result<WorkerConfig, ConfigError> {
        let scope = origin::parse_origin(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        let mut manifest = Vec::with_capacity(self.manifest.len());
        for entry in &self.manifest {
            let url = origin::resolve(&scope, entry)
                .map_err(|e| ConfigError::Invalid { field: "manifest".into(), reason: format!("{entry}: {e}") })?;
            if !origin::is_same_origin(&scope, &url) {
                return Err(ConfigError::Invalid {
                    field: "manifest".into(),
                    reason: format!("{entry} is not same-origin with {scope}"),
                });
            }
            manifest.push(url);
        }

        Ok(WorkerConfig { cache_name: self.cache_name.clone(), scope, manifest })
    }
}
