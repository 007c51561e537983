//! Error types for `leadform-core`.
//!
//! Transport errors render as messages fit to show a user. Low-level causes
//! (socket errors, upstream bodies) are kept in fields for logging and never
//! leak into `Display`.

use crate::transport::status_message;
use crate::validation::ValidationResult;

/// Errors from delivering a payload to the webhook.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The webhook answered with a non-2xx status (status-aware mode only).
    #[error("{}", status_message(*.status, .reason))]
    Rejected { status: u16, reason: String },

    /// No response was received at all.
    #[error(
        "Network error: unable to reach the submission service. Please check your connection and try again."
    )]
    Network { reason: String },

    /// The payload could not be serialized to JSON.
    #[error("failed to encode submission payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from driving a [`FormSession`](crate::session::FormSession).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A submission from this form is already in flight.
    #[error("a submission is already in progress")]
    InFlight,

    /// The form failed validation; nothing was sent.
    #[error("form has {} validation error(s)", .0.errors().len())]
    Invalid(ValidationResult),

    /// `settle` was called without a submission in flight.
    #[error("no submission is in progress")]
    NotSubmitting,
}
