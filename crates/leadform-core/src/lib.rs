//! Core library for the lead-form submission pipeline.
//!
//! Contains the field validator, payload builder, webhook transport (opaque
//! and status-aware), submission outcomes, feedback presentation, and the
//! per-form submission session. This crate knows nothing about HTTP servers;
//! the relay endpoint lives in `leadform-relay`.

pub mod error;
pub mod outcome;
pub mod payload;
pub mod presenter;
pub mod session;
pub mod transport;
pub mod validation;

pub use error::{SessionError, TransportError};
pub use outcome::SubmissionOutcome;
pub use payload::{ClientEnvironment, PayloadBuilder, SourceTag, SubmissionPayload};
pub use session::{FormSession, SubmissionState};
pub use transport::{
    Delivery, HttpWebhookSender, SubmissionTransport, Submitter, TransportConfig, TransportMode,
    WebhookResponse, WebhookSender,
};
pub use validation::{Field, FieldError, RawFormInput, ValidationResult, validate};
