//! Request history handlers.

use crate::admin_api::server::AdminState;
use crate::admin_api::types::*;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;

/// GET /history - Recent requests, most recent first
pub fn handle_list(state: &AdminState) -> Response<Full<Bytes>> {
    let response = HistoryResponse {
        requests: state.history.snapshot(),
        limit: state.history.limit(),
    };
    json_response(StatusCode::OK, &response)
}

/// DELETE /history - Forget recorded requests
pub fn handle_clear(state: &AdminState) -> Response<Full<Bytes>> {
    let cleared = state.history.clear();
    info!("Cleared {} history entries", cleared);
    json_response(StatusCode::OK, &ClearHistoryResponse { cleared })
}
