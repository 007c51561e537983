//! Submission lifecycle of one form instance.
//!
//! ```text
//! Idle ─► Validating ─┬─► Idle { errors }
//!                     └─► Submitting ─┬─► Delivered ────────────┐
//!                                     ├─► DeliveredWithWarning ─┼─► Idle (acknowledge)
//!                                     └─► Failed ───────────────┘
//! ```
//!
//! Only one submission may be in flight per session. A second submit while
//! `Submitting` is rejected, not queued. Dropping a `submit` future mid-flight,
//! or calling [`FormSession::cancel`], releases the guard. Field values are
//! reset only after a delivered outcome; a failure keeps them so the user can
//! retry.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::outcome::{OutcomeKind, SubmissionOutcome};
use crate::payload::{ClientEnvironment, PayloadBuilder, SubmissionPayload};
use crate::transport::Submitter;
use crate::validation::{Field, FieldError, RawFormInput, UnknownField, validate};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// Accepting input. Carries the violations from the last rejected attempt.
    Idle { errors: Vec<FieldError> },
    Validating,
    Submitting,
    Delivered,
    DeliveredWithWarning { warning: String },
    Failed { message: String },
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Idle { errors: Vec::new() }
    }
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::DeliveredWithWarning { .. } | Self::Failed { .. }
        )
    }
}

/// Field values plus lifecycle state for one form.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    input: RawFormInput,
    state: SubmissionState,
    builder: PayloadBuilder,
}

impl FormSession {
    pub fn new(builder: PayloadBuilder) -> Self {
        Self {
            input: RawFormInput::default(),
            state: SubmissionState::default(),
            builder,
        }
    }

    pub fn input(&self) -> &RawFormInput {
        &self.input
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Whether the submit control should be disabled.
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Validating | SubmissionState::Submitting)
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.input.field_mut(field) = value.into();
    }

    /// Update a field addressed by its element id, e.g. `"fullName"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownField`] if `id` does not name a form field.
    pub fn set_field_by_id(
        &mut self,
        id: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownField> {
        let field: Field = id.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    /// Validate the current input and, if valid, enter `Submitting`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InFlight`] if a submission is already running.
    /// - [`SessionError::Invalid`] if validation failed; the session returns to
    ///   `Idle` carrying the errors.
    pub fn begin_submit(
        &mut self,
        now: DateTime<Utc>,
        env: &ClientEnvironment,
    ) -> Result<SubmissionPayload, SessionError> {
        if self.is_submitting() {
            warn!("submit ignored, a submission is already in flight");
            return Err(SessionError::InFlight);
        }

        self.state = SubmissionState::Validating;
        let result = validate(&self.input);
        if !result.is_valid() {
            debug!(errors = result.errors().len(), "form rejected by validation");
            self.state = SubmissionState::Idle {
                errors: result.errors().to_vec(),
            };
            return Err(SessionError::Invalid(result));
        }

        self.state = SubmissionState::Submitting;
        Ok(self.builder.build(&self.input, now, env))
    }

    /// Record the outcome of the in-flight submission.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSubmitting`] if nothing is in flight.
    pub fn settle(&mut self, outcome: &SubmissionOutcome) -> Result<(), SessionError> {
        if self.state != SubmissionState::Submitting {
            return Err(SessionError::NotSubmitting);
        }

        self.state = match outcome.kind() {
            OutcomeKind::Delivered => SubmissionState::Delivered,
            OutcomeKind::DeliveredWithWarning => SubmissionState::DeliveredWithWarning {
                warning: outcome.warning.clone().unwrap_or_default(),
            },
            OutcomeKind::Failed => SubmissionState::Failed {
                message: outcome.details.clone().unwrap_or_default(),
            },
        };

        if outcome.success {
            self.input = RawFormInput::default();
        }
        info!(
            success = outcome.success,
            warned = outcome.warning.is_some(),
            "submission settled"
        );
        Ok(())
    }

    /// Leave a terminal state and accept input again.
    pub fn acknowledge(&mut self) {
        if self.state.is_terminal() {
            self.state = SubmissionState::default();
        }
    }

    /// Validate, build, send through `submitter`, and settle.
    ///
    /// # Errors
    ///
    /// Same as [`begin_submit`](Self::begin_submit). Transport failures are not
    /// errors here; they come back as a failed [`SubmissionOutcome`].
    pub async fn submit(
        &mut self,
        submitter: &dyn Submitter,
        now: DateTime<Utc>,
        env: &ClientEnvironment,
    ) -> Result<SubmissionOutcome, SessionError> {
        let payload = self.begin_submit(now, env)?;
        let mut in_flight = InFlight {
            session: self,
            settled: false,
        };
        let outcome = submitter.submit(&payload).await;
        in_flight.session.settle(&outcome)?;
        in_flight.settled = true;
        Ok(outcome)
    }

    /// Abandon the in-flight submission and accept input again.
    ///
    /// Field values are kept. Returns `false` if nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        debug!("in-flight submission abandoned");
        self.state = SubmissionState::default();
        true
    }
}

/// Releases the in-flight guard if a [`FormSession::submit`] future is dropped
/// before the outcome arrives.
struct InFlight<'a> {
    session: &'a mut FormSession,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.cancel();
        }
    }
}
