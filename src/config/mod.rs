//! Configuration for Gleaner.
//!
//! Read from `~/.config/gleaner/config.toml` or an explicit path. A missing
//! file means defaults; missing fields fall back to their defaults too.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::{RetryPolicy, DEFAULT_WORKERS};
use crate::harvest::DEFAULT_MAX_PAGES;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    /// Line-oriented proxy list (`ip:port:user:pass` per line).
    pub proxy_file: PathBuf,
    /// Search pages fetched per query at most (default: 500)
    pub max_pages: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            proxy_file: PathBuf::from(".proxies"),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Settings for the shared HTTP session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum requests in flight across the whole batch (default: 10)
    pub workers: usize,

    /// Attempts per request before giving up (default: 3)
    pub attempts: u32,

    /// Per-attempt timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Upper bound of the random pause between attempts (default: 1000)
    pub max_jitter_ms: u64,

    /// Skip TLS certificate verification (default: true).
    ///
    /// Rotating proxies frequently terminate TLS themselves; turn this off
    /// when running without proxies against sites with valid certificates.
    pub accept_invalid_certs: bool,

    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            attempts: 3,
            timeout_secs: 30,
            max_jitter_ms: 1000,
            accept_invalid_certs: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,\
                     image/webp,image/apng,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts.max(1),
            max_jitter: Duration::from_millis(self.max_jitter_ms),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse { path, source: e })
    }

    /// Get the default config file path: `~/.config/gleaner/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gleaner").join("config.toml"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
