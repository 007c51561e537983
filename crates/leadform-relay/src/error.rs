//! Error types for the relay server.
//!
//! The relay endpoint itself never returns an error to its caller, so the
//! only fallible surface is startup configuration.

/// Invalid relay configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The bind address could not be parsed.
    #[error("invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },

    /// The webhook URL is not an absolute http(s) URL.
    #[error("invalid webhook URL '{value}': must start with http:// or https://")]
    InvalidWebhookUrl { value: String },

    /// The allowed-origin pattern is not a valid regular expression.
    #[error("invalid allowed-origin pattern: {0}")]
    InvalidOriginPattern(#[from] regex::Error),

    /// A numeric setting could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}
