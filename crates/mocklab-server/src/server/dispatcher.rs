//! Request dispatch: resolve, decode, record, wait.
//!
//! The dispatcher is transport-agnostic. It turns a [`RequestDescriptor`] into
//! a [`MockResponse`] and leaves HTTP framing to the handler.

use bytes::Bytes;
use hyper::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::fixture::{
    decode_fixture, FixtureError, HttpMethod, LayeredResolver, QueryParams, RequestDescriptor,
    Resolution, ResolvedFixture,
};
use crate::history::{HistorySink, RequestHistoryEntry};
use crate::metrics;

const JSON_CONTENT_TYPE: &str = "application/json";

/// What the transport should send back.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
    /// Display path of the fixture that produced the response
    pub fixture: Option<String>,
}

/// Body of a 404 response.
#[derive(Debug, Serialize)]
struct NotFoundBody<'a> {
    error: &'static str,
    path: &'a str,
    query: &'a QueryParams,
    method: HttpMethod,
}

/// Body of a 500 response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Why a request could not be answered from a fixture.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no fixture matches {method} {path}")]
    NotFound {
        path: String,
        query: QueryParams,
        method: HttpMethod,
    },
    #[error("{source}")]
    Fixture {
        /// Display path of the fixture that failed to load
        fixture: String,
        #[source]
        source: FixtureError,
    },
    #[error("fixture lookup failed: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Fixture { .. } | DispatchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::NotFound { .. } => "not_found",
            DispatchError::Fixture { .. } | DispatchError::Internal(_) => "error",
        }
    }

    /// Structured JSON response describing the failure.
    pub fn into_response(self) -> MockResponse {
        let status = self.status();
        let body = match &self {
            DispatchError::NotFound {
                path,
                query,
                method,
            } => serde_json::to_vec(&NotFoundBody {
                error: "Mock file not found",
                path,
                query,
                method: *method,
            }),
            DispatchError::Fixture { source, .. } => serde_json::to_vec(&ErrorBody {
                error: "Error reading mock file",
                message: source.to_string(),
            }),
            DispatchError::Internal(message) => serde_json::to_vec(&ErrorBody {
                error: "Error reading mock file",
                message: message.clone(),
            }),
        };
        let fixture = match self {
            DispatchError::Fixture { fixture, .. } => Some(fixture),
            _ => None,
        };
        MockResponse {
            status,
            content_type: JSON_CONTENT_TYPE,
            body: Bytes::from(body.unwrap_or_else(|_| b"{}".to_vec())),
            fixture,
        }
    }
}

/// A fixture ready to be sent.
#[derive(Debug)]
struct Served {
    resolution: Resolution,
    fixture: ResolvedFixture,
}

/// Answers mock requests from the fixture tree.
pub struct Dispatcher {
    resolver: Arc<LayeredResolver>,
    history: Arc<dyn HistorySink>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<LayeredResolver>, history: Arc<dyn HistorySink>) -> Self {
        Self { resolver, history }
    }

    pub fn resolver(&self) -> &LayeredResolver {
        &self.resolver
    }

    /// Handle one request end to end, including the fixture's delay.
    pub async fn dispatch(&self, request: RequestDescriptor) -> MockResponse {
        let uri = request.uri();
        let method = request.method();
        let outcome = self.resolve_and_decode(request).await;

        let (fixture, error) = match &outcome {
            Ok(served) => (Some(served.resolution.display_path()), false),
            Err(DispatchError::Fixture { fixture, .. }) => (Some(fixture.clone()), true),
            Err(_) => (None, true),
        };

        info!(
            target: "mocklab::request",
            method = %method,
            uri = %uri,
            fixture = fixture.as_deref().unwrap_or("-"),
            error,
            "{} {} -> {}",
            method,
            uri,
            fixture.as_deref().unwrap_or("not found")
        );
        self.history
            .record(RequestHistoryEntry::new(uri, method.as_str(), fixture, error));

        match outcome {
            Ok(served) => {
                metrics::record_request(method.as_str(), "served");
                metrics::record_resolution(
                    served.resolution.tier.as_str(),
                    served.resolution.root.kind.label(),
                );
                let delay = served.fixture.delay();
                if !delay.is_zero() {
                    metrics::record_delay(served.fixture.delay_ms);
                    tokio::time::sleep(delay).await;
                }
                MockResponse {
                    status: StatusCode::from_u16(served.fixture.status).unwrap_or(StatusCode::OK),
                    content_type: served.fixture.content_type,
                    body: served.fixture.body,
                    fixture: Some(served.resolution.display_path()),
                }
            }
            Err(e) => {
                metrics::record_request(method.as_str(), e.outcome());
                e.into_response()
            }
        }
    }

    /// Resolve and load the fixture on the blocking pool.
    async fn resolve_and_decode(&self, request: RequestDescriptor) -> Result<Served, DispatchError> {
        let resolver = Arc::clone(&self.resolver);
        tokio::task::spawn_blocking(move || {
            let Some(resolution) = resolver.resolve(&request) else {
                return Err(DispatchError::NotFound {
                    path: request.path().to_string(),
                    query: request.query().clone(),
                    method: request.method(),
                });
            };
            match decode_fixture(&resolution.path, request.extension()) {
                Ok(fixture) => Ok(Served {
                    resolution,
                    fixture,
                }),
                Err(source) => Err(DispatchError::Fixture {
                    fixture: resolution.display_path(),
                    source,
                }),
            }
        })
        .await
        .map_err(|e| DispatchError::Internal(e.to_string()))?
    }
}
