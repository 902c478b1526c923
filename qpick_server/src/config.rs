//! Server configuration loaded from environment variables

use qpick_common::constants;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,

    /// Port for the page and the proxy endpoint
    pub port: u16,

    /// Base URL of the scoring backend (e.g., "http://127.0.0.1:8888")
    pub backend_url: String,

    /// Time allowed to connect to the backend
    pub connect_timeout: Duration,

    /// Time allowed between reads of the backend response
    pub read_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8888".to_string()),
            connect_timeout: secs_from_env("BACKEND_CONNECT_TIMEOUT_SECS", 30)?,
            read_timeout: secs_from_env("BACKEND_READ_TIMEOUT_SECS", 120)?,
        };

        match reqwest::Url::parse(&config.upstream_url()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(config),
            _ => Err(ConfigError::InvalidBackendUrl(config.backend_url)),
        }
    }

    /// Config pointing at `backend_url` with default timeouts
    pub fn with_backend(backend_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            backend_url: backend_url.into(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(120),
        }
    }

    /// Full backend endpoint (e.g., "http://127.0.0.1:8888/pick_best_question")
    pub fn upstream_url(&self) -> String {
        format!(
            "{}{}",
            self.backend_url.trim_end_matches('/'),
            constants::UPSTREAM_PATH
        )
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn secs_from_env(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout(key)),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid timeout in {0}, expected whole seconds")]
    InvalidTimeout(&'static str),

    #[error("Invalid BACKEND_URL '{0}', expected an http(s) URL")]
    InvalidBackendUrl(String),
}
