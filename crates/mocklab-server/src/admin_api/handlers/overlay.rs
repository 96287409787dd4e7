//! Overlay handlers: inspect and switch the active overlay at runtime.

use crate::admin_api::server::AdminState;
use crate::admin_api::types::*;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{info, warn};

/// GET /overlay - Active overlay name
pub fn handle_get(state: &AdminState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &OverlayResponse {
            overlay: state.overlay.get(),
            previous: None,
        },
    )
}

/// PUT /overlay - Switch or clear the active overlay
pub async fn handle_set(req: Request<Incoming>, state: &AdminState) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let request: SetOverlayRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid overlay JSON: {e}"),
            );
        }
    };

    let overlay = request.overlay.filter(|name| !name.is_empty());
    match state.overlay.set(overlay.clone()) {
        Ok(previous) => {
            info!(
                "Overlay switched from {} to {}",
                previous.as_deref().unwrap_or("none"),
                overlay.as_deref().unwrap_or("none")
            );
            json_response(
                StatusCode::OK,
                &OverlayResponse {
                    overlay,
                    previous: Some(previous),
                },
            )
        }
        Err(e) => {
            warn!("Rejected overlay change: {}", e);
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}
