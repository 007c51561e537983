//! Form relay route: `POST /api/submit-form`
//!
//! Always answers `200` with `{ success: true, warning?, details? }`. A
//! forwarding failure is logged here and nowhere else.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::routing::post;
use axum::{Json, Router};
use leadform_core::SubmissionOutcome;
use tracing::{error, info};

use crate::relay::{RelayReport, SuppressedFailure};
use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/submit-form", post(submit_form))
}

/// `POST /api/submit-form`: forward a submission to the webhook.
async fn submit_form(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Json<SubmissionOutcome> {
    let report = match body {
        Ok(bytes) => state.relay.relay(&bytes).await,
        // An unreadable body is our problem, not the browser's.
        Err(rejection) => RelayReport::absorbed(SuppressedFailure::Internal {
            reason: rejection.body_text(),
        }),
    };

    match &report.suppressed {
        Some(failure) => error!(
            warning = failure.warning(),
            details = %failure.details(),
            "submission not forwarded; client was told it succeeded"
        ),
        None => info!("submission relayed"),
    }

    Json(report.outcome)
}
