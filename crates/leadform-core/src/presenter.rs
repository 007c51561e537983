//! Turns outcomes into the toast-style feedback the form displays.

use serde::Serialize;

use crate::outcome::{OutcomeKind, SubmissionOutcome};
use crate::validation::ValidationResult;

const SUCCESS_TITLE: &str = "Success!";
const SUCCESS_DESCRIPTION: &str =
    "Your information has been submitted successfully. We'll be in touch soon!";
const ERROR_TITLE: &str = "Error";
const FALLBACK_ERROR: &str = "There was a problem submitting your form. Please try again.";

/// Visual weight of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Feedback {
    fn success() -> Self {
        Self {
            title: SUCCESS_TITLE.to_owned(),
            description: SUCCESS_DESCRIPTION.to_owned(),
            variant: Variant::Default,
        }
    }

    fn error(description: impl Into<String>) -> Self {
        Self {
            title: ERROR_TITLE.to_owned(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

/// Feedback for a settled submission.
///
/// A relay warning is not shown; the submission was accepted.
pub fn present(outcome: &SubmissionOutcome) -> Feedback {
    match outcome.kind() {
        OutcomeKind::Delivered | OutcomeKind::DeliveredWithWarning => Feedback::success(),
        OutcomeKind::Failed => Feedback::error(
            outcome
                .details
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(FALLBACK_ERROR),
        ),
    }
}

/// Feedback for a submission blocked by validation.
pub fn present_validation(result: &ValidationResult) -> Option<Feedback> {
    if result.is_valid() {
        return None;
    }
    Some(Feedback::error(result.messages().join("\n")))
}
