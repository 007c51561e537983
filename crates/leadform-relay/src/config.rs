//! Relay configuration.
//!
//! Loads settings from environment variables with sensible defaults. All
//! settings can be overridden via `LEADFORM_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use leadform_core::transport::DEFAULT_WEBHOOK_URL;
use regex::Regex;

use crate::error::ConfigError;

/// Port the relay listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3001;

/// Loopback origins on any port.
pub const DEFAULT_ALLOWED_ORIGINS: &str = r"^https?://(localhost|127\.0\.0\.1|\[::1\]):\d+$";

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Webhook every submission is forwarded to.
    pub webhook_url: String,
    /// Browser origins allowed to call the relay.
    pub allowed_origins: Regex,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Upper bound on one forward attempt. `None` waits indefinitely.
    pub forward_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            webhook_url: DEFAULT_WEBHOOK_URL.to_owned(),
            allowed_origins: default_origin_pattern(),
            log_level: "info".to_owned(),
            forward_timeout: None,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_origin_pattern() -> Regex {
    // Literal pattern; compilation cannot fail.
    Regex::new(DEFAULT_ALLOWED_ORIGINS).expect("default origin pattern is valid")
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `LEADFORM_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:3001`)
    /// - `LEADFORM_WEBHOOK_URL`: webhook to forward to
    /// - `LEADFORM_ALLOWED_ORIGINS`: CORS origin regex (default: loopback, any port)
    /// - `LEADFORM_LOG_LEVEL`: log filter (default: `info`)
    /// - `LEADFORM_FORWARD_TIMEOUT_SECS`: forward timeout (default: none)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // Priority: LEADFORM_BIND_ADDR > PORT > default 127.0.0.1:3001
        let bind_addr = if let Some(addr) = lookup("LEADFORM_BIND_ADDR") {
            addr.parse::<SocketAddr>().map_err(|e| ConfigError::InvalidBindAddr {
                value: addr.clone(),
                reason: e.to_string(),
            })?
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "PORT",
                value: port.clone(),
            })?;
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let webhook_url = lookup("LEADFORM_WEBHOOK_URL")
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.webhook_url);
        if !webhook_url.starts_with("http://") && !webhook_url.starts_with("https://") {
            return Err(ConfigError::InvalidWebhookUrl { value: webhook_url });
        }

        let allowed_origins = match lookup("LEADFORM_ALLOWED_ORIGINS") {
            Some(pattern) => Regex::new(&pattern)?,
            None => defaults.allowed_origins,
        };

        let log_level = lookup("LEADFORM_LOG_LEVEL").unwrap_or(defaults.log_level);

        let forward_timeout = match lookup("LEADFORM_FORWARD_TIMEOUT_SECS") {
            Some(secs) => {
                let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidNumber {
                    key: "LEADFORM_FORWARD_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            webhook_url,
            allowed_origins,
            log_level,
            forward_timeout,
        })
    }
}
