//! End-to-end relay tests over real sockets: a local stand-in webhook, the
//! relay router, and `reqwest` as the browser.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use chrono::Utc;
use leadform_core::outcome::OutcomeKind;
use leadform_core::{
    ClientEnvironment, Field, FormSession, HttpWebhookSender, SubmissionOutcome, SubmissionState,
    SubmissionTransport, TransportMode,
};
use leadform_relay::app::build_router;
use leadform_relay::config::DEFAULT_ALLOWED_ORIGINS;
use leadform_relay::relay::{RelayService, WARN_FORWARD_ERROR, WARN_FORWARD_REJECTED};
use leadform_relay::state::AppState;
use regex::Regex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

type Inbox = Arc<Mutex<Vec<Value>>>;

/// Serve `app` on an ephemeral loopback port.
async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

/// A webhook that records every body and answers with a fixed status.
async fn webhook(status: StatusCode, reply: &'static str) -> (String, Inbox) {
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(
            "/hook",
            post(
                move |State(inbox): State<Inbox>, axum::Json(body): axum::Json<Value>| async move {
                    inbox.lock().unwrap().push(body);
                    (status, reply)
                },
            ),
        )
        .with_state(Arc::clone(&inbox));
    let addr = serve(app).await;
    (format!("http://{addr}/hook"), inbox)
}

async fn relay_to(webhook_url: &str) -> String {
    let sender = HttpWebhookSender::new(webhook_url, "leadform-test", None).unwrap();
    let state = Arc::new(AppState::new(RelayService::new(Arc::new(sender))));
    let app = build_router(state, Regex::new(DEFAULT_ALLOWED_ORIGINS).unwrap());
    let addr = serve(app).await;
    format!("http://{addr}/api/submit-form")
}

#[tokio::test]
async fn relay_forwards_body_to_webhook() {
    let (hook_url, inbox) = webhook(StatusCode::OK, "Accepted").await;
    let relay_url = relay_to(&hook_url).await;

    let submission = json!({ "fullName": "Jo Doe", "email": "jo@x.com", "tags": ["a", "b"] });
    let response = reqwest::Client::new()
        .post(&relay_url)
        .json(&submission)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(inbox.lock().unwrap().as_slice(), &[submission]);
}

#[tokio::test]
async fn upstream_503_is_reported_as_success_with_warning() {
    let (hook_url, inbox) = webhook(StatusCode::SERVICE_UNAVAILABLE, "scenario is off").await;
    let relay_url = relay_to(&hook_url).await;

    let response = reqwest::Client::new()
        .post(&relay_url)
        .json(&json!({ "email": "jo@x.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let outcome: SubmissionOutcome = response.json().await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.warning.as_deref(), Some(WARN_FORWARD_REJECTED));
    assert_eq!(outcome.details.as_deref(), Some("scenario is off"));
    assert_eq!(inbox.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dead_webhook_is_reported_as_success_with_warning() {
    // Bind then drop to get a port nobody listens on.
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let relay_url = relay_to(&format!("http://{closed}/hook")).await;

    let outcome: SubmissionOutcome = reqwest::Client::new()
        .post(&relay_url)
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.warning.as_deref(), Some(WARN_FORWARD_ERROR));
    assert!(outcome.details.is_some());
}

#[tokio::test]
async fn form_session_through_relay_never_fails() {
    let (hook_url, inbox) = webhook(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let relay_url = relay_to(&hook_url).await;

    let sender = HttpWebhookSender::new(relay_url, "leadform-test", None).unwrap();
    let transport = SubmissionTransport::new(TransportMode::StatusAware, Arc::new(sender));

    let mut session = FormSession::default();
    session.set_field(Field::LinkedinUrl, "https://linkedin.com/in/x");
    session.set_field(Field::FullName, "Jo Doe");
    session.set_field(Field::Email, "jo@x.com");
    session.set_field(Field::Phone, "+1 555 010 9999");
    session.set_field(Field::Personality, "b".repeat(55));

    let outcome = session
        .submit(&transport, Utc::now(), &ClientEnvironment::new("relay-e2e"))
        .await
        .unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::DeliveredWithWarning);
    assert!(matches!(session.state(), SubmissionState::DeliveredWithWarning { .. }));
    assert!(session.input().email.is_empty());

    let received = inbox.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["phone"], "+1 555 010 9999");
    assert_eq!(received[0]["metadata"]["clientEnvironment"]["userAgent"], "relay-e2e");
}
