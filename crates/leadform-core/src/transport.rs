//! Webhook transport.
//!
//! [`WebhookSender`] is the seam to the network: it posts a JSON document and
//! reports status, reason, and body, or a network error. [`SubmissionTransport`]
//! layers one of two contracts on top of it:
//!
//! - [`TransportMode::Opaque`]: fire-and-forget. Any response counts as
//!   success; the status is never inspected.
//! - [`TransportMode::StatusAware`]: non-2xx statuses map to user-facing
//!   messages via [`STATUS_MESSAGES`]; a 2xx JSON body is parsed if possible.
//!
//! Both modes make exactly one attempt.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::outcome::SubmissionOutcome;
use crate::payload::{PayloadBuilder, SourceTag, SubmissionPayload};

/// Default automation webhook.
pub const DEFAULT_WEBHOOK_URL: &str = "https://hook.eu2.make.com/sbx2urs1jx2tbnwc3uan1ox2o8qnfchg";

/// Default `User-Agent` for outbound webhook requests.
pub const DEFAULT_USER_AGENT: &str = concat!("leadform/", env!("CARGO_PKG_VERSION"));

/// User-facing messages for well-known rejection statuses.
pub const STATUS_MESSAGES: [(u16, &str); 6] = [
    (400, "Invalid data format. Please check your information and try again."),
    (401, "Authentication failed with the submission service."),
    (403, "Access denied by the submission service."),
    (429, "Rate limit exceeded. Please wait a moment and try again later."),
    (500, "Server error while processing your submission. Please try again later."),
    (503, "The submission service is temporarily unavailable. Please try again later."),
];

/// Message for a non-2xx status, falling back to the raw status line.
pub fn status_message(status: u16, reason: &str) -> String {
    STATUS_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map_or_else(
            || format!("Submission failed: {status} {reason}").trim_end().to_owned(),
            |(_, message)| (*message).to_owned(),
        )
}

/// Raw answer from the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    /// Canonical reason phrase, e.g. `Service Unavailable`. May be empty.
    pub reason: String,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts JSON documents to a webhook.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait WebhookSender: Send + Sync + 'static {
    /// Send `body` once.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] when no response was received.
    async fn post_json(&self, body: &serde_json::Value) -> Result<WebhookResponse, TransportError>;

    /// Send `body` once and return the status as soon as the response head
    /// arrives. The response body is not read.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] when no response was received.
    async fn post_json_unread(&self, body: &serde_json::Value) -> Result<u16, TransportError> {
        self.post_json(body).await.map(|response| response.status)
    }
}

/// [`WebhookSender`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    url: String,
    client: reqwest::Client,
}

impl HttpWebhookSender {
    /// Create a sender for `url`. `timeout` of `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Resolves once the response head is in.
    async fn dispatch(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, TransportError> {
        self.client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn post_json(&self, body: &serde_json::Value) -> Result<WebhookResponse, TransportError> {
        let response = self.dispatch(body).await?;

        let status = response.status();
        // An unreadable body still counts as a response.
        let body = response.text().await.unwrap_or_default();

        Ok(WebhookResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }

    async fn post_json_unread(&self, body: &serde_json::Value) -> Result<u16, TransportError> {
        Ok(self.dispatch(body).await?.status().as_u16())
    }
}

/// Which response contract the transport honours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    /// Fire-and-forget; the response is never read.
    Opaque,
    /// Status codes are mapped to user-facing messages.
    #[default]
    StatusAware,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Opaque => "opaque",
            Self::StatusAware => "status-aware",
        })
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opaque" | "no-cors" => Ok(Self::Opaque),
            "status-aware" | "status_aware" | "cors" => Ok(Self::StatusAware),
            other => Err(format!("unknown transport mode '{other}'")),
        }
    }
}

/// What a successful send produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delivery {
    /// `None` in opaque mode.
    pub status: Option<u16>,
    /// Parsed 2xx body, when it was JSON.
    pub body: Option<serde_json::Value>,
}

/// Sends payloads to the webhook under one [`TransportMode`].
#[derive(Clone)]
pub struct SubmissionTransport {
    mode: TransportMode,
    sender: Arc<dyn WebhookSender>,
}

impl fmt::Debug for SubmissionTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionTransport")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SubmissionTransport {
    pub fn new(mode: TransportMode, sender: Arc<dyn WebhookSender>) -> Self {
        Self { mode, sender }
    }

    /// Build an HTTP-backed transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let sender = HttpWebhookSender::new(
            config.webhook_url.clone(),
            &config.user_agent,
            config.timeout,
        )?;
        Ok(Self::new(config.mode, Arc::new(sender)))
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Send the payload once.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Network`] in either mode when no response arrives.
    /// - [`TransportError::Rejected`] in status-aware mode on a non-2xx status.
    pub async fn send(&self, payload: &SubmissionPayload) -> Result<Delivery, TransportError> {
        let body = serde_json::to_value(payload)?;
        let log_unreachable = |e: &TransportError| {
            if let TransportError::Network { reason } = e {
                warn!(mode = %self.mode, reason = %reason, "webhook unreachable");
            }
        };

        match self.mode {
            TransportMode::Opaque => {
                self.sender
                    .post_json_unread(&body)
                    .await
                    .inspect_err(log_unreachable)?;
                debug!("webhook request sent (opaque, response not inspected)");
                Ok(Delivery::default())
            }
            TransportMode::StatusAware => {
                let response = self
                    .sender
                    .post_json(&body)
                    .await
                    .inspect_err(log_unreachable)?;
                if !response.is_success() {
                    warn!(
                        status = response.status,
                        reason = %response.reason,
                        "webhook rejected submission"
                    );
                    return Err(TransportError::Rejected {
                        status: response.status,
                        reason: response.reason,
                    });
                }

                // A non-JSON success body is not an error.
                let body = serde_json::from_str(&response.body).ok();
                debug!(
                    status = response.status,
                    parsed_body = body.is_some(),
                    "webhook accepted submission"
                );
                Ok(Delivery {
                    status: Some(response.status),
                    body,
                })
            }
        }
    }
}

/// Anything that can turn a payload into an outcome.
#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> SubmissionOutcome;
}

#[async_trait::async_trait]
impl Submitter for SubmissionTransport {
    async fn submit(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        match self.send(payload).await {
            Ok(delivery) => SubmissionOutcome::from_delivery(&delivery),
            Err(err) => SubmissionOutcome::failed(err.to_string()),
        }
    }
}

/// Client-side transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Webhook (or relay) URL to post to.
    pub webhook_url: String,
    pub mode: TransportMode,
    /// Tag stamped on every payload from this form.
    pub source_tag: SourceTag,
    pub user_agent: String,
    /// No timeout when `None`.
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_owned(),
            mode: TransportMode::default(),
            source_tag: SourceTag::default(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn payload_builder(&self) -> PayloadBuilder {
        PayloadBuilder::new(self.source_tag.clone())
    }
}
