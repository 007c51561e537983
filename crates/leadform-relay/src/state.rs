//! Shared application state for the relay server.
//!
//! Holds no mutable data: each request is relayed independently.

use crate::relay::RelayService;

/// State passed to all HTTP handlers via `Arc`.
#[derive(Debug)]
pub struct AppState {
    /// Forwards submissions to the webhook.
    pub relay: RelayService,
}

impl AppState {
    pub fn new(relay: RelayService) -> Self {
        Self { relay }
    }
}
