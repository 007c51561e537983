//! HTTP route handlers for the relay API.

pub mod submit;
