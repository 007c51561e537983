//! Lead-form relay entry point.
//!
//! Loads configuration, builds the webhook client and router, then serves
//! `POST /api/submit-form` until SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use leadform_core::HttpWebhookSender;
use leadform_core::transport::DEFAULT_USER_AGENT;
use leadform_relay::app::build_router;
use leadform_relay::config::RelayConfig;
use leadform_relay::relay::RelayService;
use leadform_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env().context("invalid relay configuration")?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        timeout_secs = config.forward_timeout.map(|t| t.as_secs()),
        "leadform relay starting"
    );

    let sender = HttpWebhookSender::new(
        config.webhook_url.clone(),
        DEFAULT_USER_AGENT,
        config.forward_timeout,
    )
    .context("failed to build webhook client")?;

    let state = Arc::new(AppState::new(RelayService::new(Arc::new(sender))));
    let app = build_router(state, config.allowed_origins.clone());

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("relay stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping relay");
}
