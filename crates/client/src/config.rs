//! Client configuration.
//!
//! Values come from the environment (see the `*_ENV` constants); the CLI
//! overlays its own flags on top.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const API_URL_ENV: &str = "STOCKROOM_API_URL";
pub const TIMEOUT_ENV: &str = "STOCKROOM_TIMEOUT_SECS";
pub const AUTH_TOKEN_ENV: &str = "STOCKROOM_AUTH_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("API URL must use http or https, got {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid timeout {0:?}: expected whole seconds greater than zero")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute base URL; always ends with `/` so relative paths join under it.
    pub api_base_url: Url,
    pub request_timeout: Duration,
    /// Sent as `Authorization: Bearer` in addition to the session cookie.
    pub bearer_token: Option<String>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            request_timeout: DEFAULT_TIMEOUT,
            bearer_token: None,
            user_agent: format!("stockroom/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (environment-shaped key/value source).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&url)?;

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.request_timeout = parse_timeout(&raw)?;
        }
        if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            config.bearer_token = Some(token);
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
