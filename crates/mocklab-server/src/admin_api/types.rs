//! Request and response types for the Admin API, plus the response helpers
//! shared with the mock listener.

use crate::history::RequestHistoryEntry;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Response for GET /history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Most recent first
    pub requests: Vec<RequestHistoryEntry>,
    pub limit: usize,
}

/// Response for DELETE /history
#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub cleared: usize,
}

/// Response for GET and PUT /overlay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResponse {
    pub overlay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Option<String>>,
}

/// Request body for PUT /overlay. `null` or `""` disables the overlay.
#[derive(Debug, Deserialize)]
pub struct SetOverlayRequest {
    pub overlay: Option<String>,
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers.
///
/// This function handles the unlikely case where Response::builder() fails
/// by returning a minimal 500 error response.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| internal_error())
}

fn internal_error() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Collect request body into bytes
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    use http_body_util::BodyExt;
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_format() {
        let resp = error_response(StatusCode::BAD_REQUEST, "Test error");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_json_response() {
        let body = serde_json::json!({"test": "value"});
        let resp = json_response(StatusCode::OK, &body);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_not_found_response() {
        let resp = not_found();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_header_falls_back_to_500() {
        let resp = build_response_with_headers(StatusCode::OK, [("x-bad", "line\nbreak")], "body");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_build_response_with_headers_sets_status_and_headers() {
        let resp = build_response_with_headers(
            StatusCode::ACCEPTED,
            [("Content-Type", "text/plain")],
            "ok",
        );
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(resp.headers()["content-type"], "text/plain");
    }

    #[test]
    fn test_set_overlay_request_accepts_null() {
        let req: SetOverlayRequest = serde_json::from_str(r#"{"overlay": null}"#).unwrap();
        assert_eq!(req.overlay, None);
        let req: SetOverlayRequest = serde_json::from_str(r#"{"overlay": "staging"}"#).unwrap();
        assert_eq!(req.overlay.as_deref(), Some("staging"));
    }

    #[test]
    fn test_overlay_response_omits_previous_when_unset() {
        let json = serde_json::to_value(OverlayResponse {
            overlay: None,
            previous: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"overlay": null}));

        let json = serde_json::to_value(OverlayResponse {
            overlay: Some("b".to_string()),
            previous: Some(Some("a".to_string())),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"overlay": "b", "previous": "a"}));
    }
}
