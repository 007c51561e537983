//! The normalized result handed back to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::transport::Delivery;

/// Result of one submission attempt: `{ success, warning?, details? }`.
///
/// Only the direct transport produces `success: false`. The relay always
/// answers with `success: true`, attaching a warning when forwarding failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Coarse classification of an outcome, matching the lifecycle's terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Delivered,
    DeliveredWithWarning,
    Failed,
}

impl SubmissionOutcome {
    pub fn delivered() -> Self {
        Self {
            success: true,
            warning: None,
            details: None,
        }
    }

    pub fn delivered_with_warning(warning: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: true,
            warning: Some(warning.into()),
            details: Some(details.into()),
        }
    }

    /// A failed submission; `message` is what the user will read.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            warning: None,
            details: Some(message.into()),
        }
    }

    /// Interpret a successful delivery.
    ///
    /// A 2xx body that is itself an outcome envelope carrying a warning (what
    /// the relay returns when forwarding failed) is kept as such; any other
    /// body, or none, is a plain delivery.
    pub fn from_delivery(delivery: &Delivery) -> Self {
        delivery
            .body
            .as_ref()
            .and_then(|body| serde_json::from_value::<Self>(body.clone()).ok())
            .filter(|envelope| envelope.success && envelope.warning.is_some())
            .unwrap_or_else(Self::delivered)
    }

    pub fn kind(&self) -> OutcomeKind {
        match (self.success, self.warning.is_some()) {
            (false, _) => OutcomeKind::Failed,
            (true, true) => OutcomeKind::DeliveredWithWarning,
            (true, false) => OutcomeKind::Delivered,
        }
    }
}
