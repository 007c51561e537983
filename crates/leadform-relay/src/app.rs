//! Router assembly: routes, CORS, tracing, and response hardening.

use std::any::Any;
use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use regex::Regex;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::relay::SuppressedFailure;
use crate::routes;
use crate::state::AppState;

/// Build the relay router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, allowed_origins: Regex) -> Router {
    let app = Router::new()
        .nest("/api", routes::submit::router())
        .with_state(state);

    with_middleware(app, allowed_origins)
}

/// Wrap a router in the relay's middleware stack.
///
/// A panic anywhere below is answered like any other relay failure: `200`
/// with `success: true` and an internal-error warning.
pub fn with_middleware(app: Router, allowed_origins: Regex) -> Router {
    app.layer(CatchPanicLayer::custom(absorb_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

/// CORS restricted to origins matching `allowed_origins`.
pub fn cors_layer(allowed_origins: Regex) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| allowed_origins.is_match(origin))
            },
        ))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[allow(clippy::needless_pass_by_value)]
fn absorb_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic".to_owned()
    };

    let failure = SuppressedFailure::Internal { reason };
    error!(details = %failure.details(), "relay handler panicked; client was told it succeeded");
    Json(failure.to_outcome()).into_response()
}
