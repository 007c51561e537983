//! Failure-absorbing relay to the automation webhook.
//!
//! Every submission is forwarded once. The caller always receives a
//! `success: true` outcome; when forwarding fails the outcome carries a
//! warning, and the failure itself is handed back separately as a
//! [`SuppressedFailure`] so it can be logged without ever reaching the client
//! as an error.

use std::fmt;
use std::sync::Arc;

use leadform_core::{SubmissionOutcome, TransportError, WebhookSender};
use tracing::debug;

/// Warning when the webhook answered with a non-2xx status.
pub const WARN_FORWARD_REJECTED: &str = "Failed to forward to webhook";
/// Warning when the webhook could not be reached.
pub const WARN_FORWARD_ERROR: &str = "Error forwarding to webhook";
/// Warning when the relay itself failed.
pub const WARN_INTERNAL: &str = "Internal server error";

/// A forwarding problem hidden from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressedFailure {
    /// The webhook answered with a non-2xx status.
    Rejected { status: u16, body: String },
    /// No response from the webhook.
    Unreachable { reason: String },
    /// The relay failed before or while forwarding.
    Internal { reason: String },
}

impl SuppressedFailure {
    pub fn warning(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => WARN_FORWARD_REJECTED,
            Self::Unreachable { .. } => WARN_FORWARD_ERROR,
            Self::Internal { .. } => WARN_INTERNAL,
        }
    }

    /// Diagnostic text returned in the `details` field.
    pub fn details(&self) -> &str {
        match self {
            Self::Rejected { body, .. } => body,
            Self::Unreachable { reason } | Self::Internal { reason } => reason,
        }
    }

    pub fn to_outcome(&self) -> SubmissionOutcome {
        SubmissionOutcome::delivered_with_warning(self.warning(), self.details())
    }
}

impl fmt::Display for SuppressedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, .. } => write!(f, "{} (status {status})", self.warning()),
            Self::Unreachable { reason } | Self::Internal { reason } => {
                write!(f, "{}: {reason}", self.warning())
            }
        }
    }
}

/// What the relay tells the caller, plus what it kept to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    /// Always `success: true`.
    pub outcome: SubmissionOutcome,
    /// Present whenever the outcome carries a warning.
    pub suppressed: Option<SuppressedFailure>,
}

impl RelayReport {
    pub fn forwarded() -> Self {
        Self {
            outcome: SubmissionOutcome::delivered(),
            suppressed: None,
        }
    }

    pub fn absorbed(failure: SuppressedFailure) -> Self {
        Self {
            outcome: failure.to_outcome(),
            suppressed: Some(failure),
        }
    }
}

/// Forwards submissions to one webhook.
pub struct RelayService {
    sender: Arc<dyn WebhookSender>,
}

impl fmt::Debug for RelayService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayService").finish_non_exhaustive()
    }
}

impl RelayService {
    pub fn new(sender: Arc<dyn WebhookSender>) -> Self {
        Self { sender }
    }

    /// Relay a raw request body. Never fails.
    ///
    /// The body must be JSON; its shape is not checked. An empty or
    /// whitespace-only body is forwarded as `{}`. A body that does not parse
    /// is treated as an internal failure, is not forwarded, and is still
    /// answered with success.
    pub async fn relay(&self, body: &[u8]) -> RelayReport {
        let document = if body.trim_ascii().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_slice(body) {
                Ok(document) => document,
                Err(e) => {
                    return RelayReport::absorbed(SuppressedFailure::Internal {
                        reason: e.to_string(),
                    });
                }
            }
        };

        match self.forward(&document).await {
            Ok(()) => RelayReport::forwarded(),
            Err(failure) => RelayReport::absorbed(failure),
        }
    }

    /// One attempt, no retry.
    async fn forward(&self, document: &serde_json::Value) -> Result<(), SuppressedFailure> {
        let response = self
            .sender
            .post_json(document)
            .await
            .map_err(|e| match e {
                TransportError::Network { reason } => SuppressedFailure::Unreachable { reason },
                other => SuppressedFailure::Internal {
                    reason: other.to_string(),
                },
            })?;

        if !response.is_success() {
            return Err(SuppressedFailure::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        debug!(status = response.status, "submission forwarded");
        Ok(())
    }
}
