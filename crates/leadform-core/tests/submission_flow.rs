//! End-to-end submission flows through a form session and the direct
//! transport, with the network replaced by a counting sender.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use leadform_core::outcome::OutcomeKind;
use leadform_core::presenter::{self, Variant};
use leadform_core::{
    ClientEnvironment, Field, FormSession, PayloadBuilder, SessionError, SourceTag,
    SubmissionState, SubmissionTransport, TransportError, TransportMode, WebhookResponse,
    WebhookSender,
};

struct CountingSender {
    status: u16,
    calls: AtomicUsize,
    last: Mutex<Option<serde_json::Value>>,
}

impl CountingSender {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl WebhookSender for CountingSender {
    async fn post_json(&self, body: &serde_json::Value) -> Result<WebhookResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(body.clone());
        Ok(WebhookResponse {
            status: self.status,
            reason: String::new(),
            body: String::new(),
        })
    }
}

fn session_with(email: &str) -> FormSession {
    let mut session = FormSession::new(PayloadBuilder::new(SourceTag::new("cta-main")));
    session.set_field(Field::LinkedinUrl, "https://linkedin.com/in/x");
    session.set_field(Field::FullName, "Jo Doe");
    session.set_field(Field::Email, email);
    session.set_field(Field::Phone, "");
    session.set_field(
        Field::Personality,
        "I have been building community programs for about ten years.",
    );
    session
}

fn env() -> ClientEnvironment {
    ClientEnvironment::new("Mozilla/5.0 (X11; Linux x86_64)").with_timezone("America/Chicago")
}

#[tokio::test]
async fn valid_submission_is_sent_once_without_phone() {
    let sender = CountingSender::new(200);
    let transport = SubmissionTransport::new(
        TransportMode::StatusAware,
        Arc::clone(&sender) as Arc<dyn WebhookSender>,
    );
    let mut session = session_with("jo@x.com");
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();

    let outcome = session.submit(&transport, now, &env()).await.unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::Delivered);
    assert_eq!(sender.calls.load(Ordering::SeqCst), 1);

    let sent = sender.last.lock().unwrap().clone().unwrap();
    assert!(sent.get("phone").is_none());
    assert_eq!(sent["metadata"]["sourceTag"], "cta-main");
    assert_eq!(sent["metadata"]["timezone"], "America/Chicago");
    assert_eq!(sent["metadata"]["submissionTimestamp"], "2026-10-19T08:30:00.000Z");

    assert_eq!(session.state(), &SubmissionState::Delivered);
    assert!(session.input().email.is_empty());
    assert_eq!(presenter::present(&outcome).title, "Success!");
}

#[tokio::test]
async fn invalid_email_blocks_the_network_call() {
    let sender = CountingSender::new(200);
    let transport = SubmissionTransport::new(
        TransportMode::StatusAware,
        Arc::clone(&sender) as Arc<dyn WebhookSender>,
    );
    let mut session = session_with("not-an-email");

    let err = session.submit(&transport, Utc::now(), &env()).await.unwrap_err();

    let SessionError::Invalid(result) = err else {
        unreachable!("expected a validation error, got {err:?}");
    };
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].field, Field::Email);
    assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_submission_fails_and_keeps_input() {
    let sender = CountingSender::new(503);
    let transport = SubmissionTransport::new(TransportMode::StatusAware, sender);
    let mut session = session_with("jo@x.com");

    let outcome = session.submit(&transport, Utc::now(), &env()).await.unwrap();

    assert!(!outcome.success);
    let feedback = presenter::present(&outcome);
    assert_eq!(feedback.variant, Variant::Destructive);
    assert!(feedback.description.contains("temporarily unavailable"));
    assert_eq!(session.input().email, "jo@x.com");
}

#[tokio::test]
async fn opaque_mode_reports_success_even_on_upstream_error() {
    let sender = CountingSender::new(500);
    let transport = SubmissionTransport::new(TransportMode::Opaque, sender);
    let mut session = session_with("jo@x.com");

    let outcome = session.submit(&transport, Utc::now(), &env()).await.unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Delivered);
}
