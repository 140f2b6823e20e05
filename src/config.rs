//! Web server configuration from the environment.

use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Where to listen and which backend to talk to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub backend_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend_url: default_backend_url(),
        }
    }
}

impl WebConfig {
    /// Read `HOST`, `PORT` and `BACKEND_URL`, falling back to defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(default_host);
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => default_port(),
        };
        let backend_url = lookup("BACKEND_URL").unwrap_or_else(default_backend_url);
        Ok(Self {
            host,
            port,
            backend_url,
        })
    }
}
