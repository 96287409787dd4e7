//! Admin REST API for inspecting and steering a running mock server.
//!
//! This module provides endpoints for:
//! - Health, configuration and Prometheus metrics
//! - Reading and clearing the request history
//! - Switching the active overlay without a restart
//!
//! The API listens on its own port, enabled by `adminPort`.

mod handlers;
mod router;
mod server;
pub(crate) mod types;

pub use server::{AdminApiServer, AdminState};
