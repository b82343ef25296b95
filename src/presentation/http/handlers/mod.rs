//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod draw;
pub mod environment;
pub mod health;
