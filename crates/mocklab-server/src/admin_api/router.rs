//! Route dispatch logic for the Admin API.

use crate::admin_api::handlers::{history, overlay, system};
use crate::admin_api::server::AdminState;
use crate::admin_api::types::{error_response, not_found};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    state: Arc<AdminState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Admin API: {} {}", method, path);

    let response = route_by_path(&method, &path, req, state).await;
    Ok(response)
}

/// Route based on path
async fn route_by_path(
    method: &Method,
    path: &str,
    req: Request<Incoming>,
    state: Arc<AdminState>,
) -> Response<Full<Bytes>> {
    let path = path.trim_end_matches('/');
    match (method, path) {
        (&Method::GET, "/health") => system::handle_health(),
        (&Method::GET, "/metrics") => system::handle_metrics(),
        (&Method::GET, "/config") => system::handle_config(&state),

        (&Method::GET, "/history") => history::handle_list(&state),
        (&Method::DELETE, "/history") => history::handle_clear(&state),

        (&Method::GET, "/overlay") => overlay::handle_get(&state),
        (&Method::PUT, "/overlay") => overlay::handle_set(req, &state).await,

        (_, "/health" | "/metrics" | "/config" | "/history" | "/overlay") => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        _ => not_found(),
    }
}
