//! The `reqwest`-backed transport against local sockets.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::routing::post;
use chrono::Utc;
use leadform_core::{
    ClientEnvironment, Delivery, RawFormInput, SourceTag, SubmissionTransport, TransportConfig,
    TransportMode,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Inbox = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// A webhook that records the `User-Agent` and body of every request.
async fn webhook() -> (String, Inbox) {
    let inbox: Inbox = Arc::default();
    let app = Router::new()
        .route(
            "/hook",
            post(
                |State(inbox): State<Inbox>,
                 headers: HeaderMap,
                 axum::Json(body): axum::Json<Value>| async move {
                    let agent = headers
                        .get(header::USER_AGENT)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    inbox.lock().unwrap().push((agent, body));
                    "Accepted"
                },
            ),
        )
        .with_state(Arc::clone(&inbox));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (format!("http://{addr}/hook"), inbox)
}

/// Answers with a status line and headers, then never sends the body.
async fn stalled_webhook() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1024\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    });
    format!("http://{addr}/hook")
}

fn input() -> RawFormInput {
    RawFormInput {
        linkedin_url: "https://linkedin.com/in/jo".to_owned(),
        full_name: " Jo Doe ".to_owned(),
        email: "jo@x.com".to_owned(),
        phone: String::new(),
        personality: "p".repeat(60),
    }
}

#[tokio::test]
async fn configured_transport_posts_tagged_payload() {
    let (url, inbox) = webhook().await;
    let config = TransportConfig {
        webhook_url: url,
        source_tag: SourceTag::new("footer-cta"),
        user_agent: "leadform-test/1".to_owned(),
        timeout: Some(Duration::from_secs(5)),
        ..TransportConfig::default()
    };
    let transport = SubmissionTransport::from_config(&config).unwrap();
    assert_eq!(transport.mode(), TransportMode::StatusAware);

    let env = ClientEnvironment::new("browser");
    let payload = config.payload_builder().build(&input(), Utc::now(), &env);
    let delivery = transport.send(&payload).await.unwrap();

    assert_eq!(delivery.status, Some(200));
    assert_eq!(delivery.body, None);

    let received = inbox.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (agent, body) = &received[0];
    assert_eq!(agent.as_deref(), Some("leadform-test/1"));
    assert_eq!(body["fullName"], "Jo Doe");
    assert_eq!(body["metadata"]["sourceTag"], "footer-cta");
    assert!(body.get("phone").is_none());
}

#[tokio::test]
async fn opaque_send_returns_once_headers_arrive() {
    let config = TransportConfig {
        webhook_url: stalled_webhook().await,
        mode: TransportMode::Opaque,
        ..TransportConfig::default()
    };
    let transport = SubmissionTransport::from_config(&config).unwrap();
    let payload = config
        .payload_builder()
        .build(&input(), Utc::now(), &ClientEnvironment::default());

    let delivery = tokio::time::timeout(Duration::from_secs(5), transport.send(&payload))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivery, Delivery::default());
}
