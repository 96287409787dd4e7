//! HTTP handling for mock requests.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use super::dispatcher::Dispatcher;
use crate::admin_api::types::{build_response_with_headers, json_response};
use crate::fixture::{parse_query_string, HttpMethod, RequestDescriptor};
use crate::metrics;

/// Header naming the fixture that produced a response.
pub const FIXTURE_HEADER: &str = "x-mocklab-fixture";

/// Handle a request to the mock listener
pub async fn handle_mock_request(
    req: Request<Incoming>,
    dispatcher: Arc<Dispatcher>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let Some(method) = HttpMethod::from_http(req.method()) else {
        debug!("Rejecting unsupported method {}", req.method());
        metrics::record_request(req.method().as_str(), "rejected");
        return Ok(json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({
                "error": "Method not allowed",
                "method": req.method().as_str(),
            }),
        ));
    };

    let query = parse_query_string(req.uri().query());
    let descriptor = RequestDescriptor::new(req.uri().path(), method, query);
    let response = dispatcher.dispatch(descriptor).await;

    let mut headers = vec![("Content-Type", response.content_type.to_string())];
    // Paths that are not valid header text are left out rather than failing
    // the response.
    if let Some(fixture) = response
        .fixture
        .filter(|f| hyper::header::HeaderValue::from_str(f).is_ok())
    {
        headers.push((FIXTURE_HEADER, fixture));
    }
    Ok(build_response_with_headers(
        response.status,
        headers,
        response.body,
    ))
}
