//! System handlers: health, metrics, config.

use crate::admin_api::server::AdminState;
use crate::admin_api::types::*;
use crate::metrics::collect_metrics;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}

/// GET /metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        collect_metrics(),
    )
}

/// GET /config - Effective configuration with the overlay active right now
pub fn handle_config(state: &AdminState) -> Response<Full<Bytes>> {
    let mut config = state.config.clone();
    config.overlay = state.overlay.get();
    json_response(StatusCode::OK, &config)
}
