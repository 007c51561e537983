//! Lead-form relay server.
//!
//! A same-origin endpoint that forwards form submissions to the automation
//! webhook. Whatever happens upstream, the browser receives `200` with
//! `{ success: true }`; forwarding problems are reported only to the logs.

pub mod app;
pub mod config;
pub mod error;
pub mod relay;
pub mod routes;
pub mod state;
