//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Coachline
//! server. It retrieves configuration values from environment variables and
//! provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `BACKEND_URL`: Base URL of the hosted backend (required)
//! - `BACKEND_ANON_KEY`: Public API key of the hosted backend (required)
//! - `BACKEND_SERVICE_ROLE_KEY`: Privileged key for account provisioning
//! - `SITE_URL`: Public URL of this site, used for auth redirects
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `VIEW_CACHE_TTL_SECONDS`: Freshness window of cached views (default: 30)
//! - `SESSION_COOKIE`: Name of the session cookie (default: "coachline-session")
//! - `WEBHOOK_SECRET`: Shared secret expected on change notifications

use std::{env, time::Duration};

use coachline_remote::RemoteConfig;
use eyre::{Result, WrapErr, eyre};
use tracing::Level;

/// Configuration for the Coachline server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use coachline_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the server to listen on
    pub port: u16,

    /// Base URL of the hosted backend
    pub backend_url: String,

    /// Public API key of the hosted backend
    pub backend_anon_key: String,

    /// Privileged key, only used for server-side account provisioning
    pub backend_service_role_key: Option<String>,

    /// Public URL of this site
    pub site_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// How long a cached view stays fresh, in seconds
    pub cache_ttl: u64,

    /// Session cookie name
    pub session_cookie: String,

    /// Secret expected in `x-webhook-secret` on change notifications
    pub webhook_secret: Option<String>,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `BACKEND_URL` or `BACKEND_ANON_KEY` is not set
    /// - The `API_PORT` value cannot be parsed as a u16
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        let backend_url = lookup("BACKEND_URL")
            .ok_or_else(|| eyre!("BACKEND_URL environment variable must be set"))?;
        let backend_anon_key = lookup("BACKEND_ANON_KEY")
            .ok_or_else(|| eyre!("BACKEND_ANON_KEY environment variable must be set"))?;
        let backend_service_role_key = lookup("BACKEND_SERVICE_ROLE_KEY").filter(|k| !k.is_empty());

        let site_url = lookup("SITE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let cache_ttl = lookup("VIEW_CACHE_TTL_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let session_cookie =
            lookup("SESSION_COOKIE").unwrap_or_else(|| "coachline-session".to_string());
        let webhook_secret = lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            backend_url,
            backend_anon_key,
            backend_service_role_key,
            site_url,
            log_level,
            cors_origins,
            request_timeout,
            cache_ttl,
            session_cookie,
            webhook_secret,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection settings for the backend client.
    pub fn remote_config(&self) -> RemoteConfig {
        let config = RemoteConfig::new(&self.backend_url, &self.backend_anon_key);
        match &self.backend_service_role_key {
            Some(key) => config.with_service_role_key(key),
            None => config,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Absolute URL on this site for `path`.
    pub fn site_link(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}
