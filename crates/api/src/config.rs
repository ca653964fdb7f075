//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `LOCAL_CACHE_DIR`: Directory for the file-backed local cache (optional)
//!
//! The hosted provider variables are read by [`ProviderConfig`].

use eyre::{Result, WrapErr, eyre};
use std::{env, path::PathBuf};
use tracing::Level;
use tutorbook_providers::ProviderConfig;

/// Configuration for the booking API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL connection string of the structured store
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// File-backed local cache location; in-memory when unset
    pub cache_dir: Option<PathBuf>,

    pub providers: ProviderConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - Any provider variable is missing or malformed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("API_PORT") {
            Some(raw) => raw.trim().parse().wrap_err("Invalid API_PORT value")?,
            None => 3000,
        };

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        let log_level = var("LOG_LEVEL")
            .map(|raw| parse_log_level(&raw))
            .unwrap_or(Level::INFO);

        let cors_origins = var("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Malformed timeouts fall back to the default
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(30);

        let cache_dir = var("LOCAL_CACHE_DIR").map(PathBuf::from);

        let providers = ProviderConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            cache_dir,
            providers,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Unknown levels fall back to `INFO`.
pub fn parse_log_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
