//! Normalization of validated form input into the webhook payload.
//!
//! The builder never reads ambient state: the clock and the client
//! environment are passed in, so the same inputs always produce the same
//! payload.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::RawFormInput;

/// Timezone reported when the client did not resolve one.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Identifies which form instance produced a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTag(String);

impl SourceTag {
    pub const DEFAULT: &'static str = "landing-cta";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SourceTag {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Browser-side facts captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientEnvironment {
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// IANA zone name, e.g. `Europe/Berlin`. Reported in the metadata block.
    #[serde(skip)]
    pub timezone: Option<String>,
}

impl ClientEnvironment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            language: None,
            timezone: None,
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The client's timezone, or [`FALLBACK_TIMEZONE`] when unknown.
    pub fn resolved_timezone(&self) -> &str {
        self.timezone
            .as_deref()
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .unwrap_or(FALLBACK_TIMEZONE)
    }
}

/// Submission metadata stamped at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub submission_timestamp: String,
    pub timezone: String,
    pub source_tag: SourceTag,
    pub client_environment: ClientEnvironment,
}

/// The JSON body sent to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub linkedin_url: String,
    pub full_name: String,
    pub email: String,
    /// Trimmed and non-empty, or absent from the JSON entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub personality: String,
    pub metadata: SubmissionMetadata,
}

/// Builds payloads for one form instance.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    source_tag: SourceTag,
}

impl PayloadBuilder {
    pub fn new(source_tag: SourceTag) -> Self {
        Self { source_tag }
    }

    /// Trim the input and attach metadata.
    ///
    /// Expects input that already passed [`validate`](crate::validation::validate).
    pub fn build(
        &self,
        input: &RawFormInput,
        now: DateTime<Utc>,
        env: &ClientEnvironment,
    ) -> SubmissionPayload {
        let phone = Some(input.phone.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        SubmissionPayload {
            linkedin_url: input.linkedin_url.trim().to_owned(),
            full_name: input.full_name.trim().to_owned(),
            email: input.email.trim().to_owned(),
            phone,
            personality: input.personality.trim().to_owned(),
            metadata: SubmissionMetadata {
                submission_timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                timezone: env.resolved_timezone().to_owned(),
                source_tag: self.source_tag.clone(),
                client_environment: env.clone(),
            },
        }
    }
}
