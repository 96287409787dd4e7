//! Type definitions shared by the fixture resolution pipeline.
//!
//! This module contains the request descriptor consumed by the search, the
//! fixture produced by the decoder, and the error types of both.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::mime::{split_extension, DEFAULT_EXTENSION};

/// Query parameters of a request, decoded. Ordered so that echoed bodies and
/// serialized URIs are stable.
pub type QueryParams = BTreeMap<String, String>;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP methods a fixture can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Case-insensitive lookup, `None` for anything that is not routed.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(value))
    }

    /// Map a hyper method onto a routed method.
    pub fn from_http(method: &hyper::Method) -> Option<Self> {
        Self::parse(method.as_str())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported HTTP method: {s}"))
    }
}

// ============================================================================
// Query String
// ============================================================================

/// Parse a raw query string into decoded parameters.
///
/// `+` decodes to a space, a key without `=` is present with an empty value,
/// and repeated keys are joined with `,`.
pub fn parse_query_string(query: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(query) = query else {
        return params;
    };

    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        let value = decode_component(value);
        params
            .entry(key)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    params
}

/// Serialize parameters back into `k=v&k2=v2` form (unencoded, for display).
pub fn serialize_query(query: &QueryParams) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ============================================================================
// Request Descriptor
// ============================================================================

/// Everything the resolver needs to know about one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Path as received, with `/` normalized to `/index`
    path: String,
    /// Decoded lookup segments, extension stripped
    segments: Vec<String>,
    method: HttpMethod,
    query: QueryParams,
    extension: String,
}

impl RequestDescriptor {
    /// Build a descriptor from a raw request path.
    ///
    /// The path is percent-decoded and split into segments; empty, `.` and
    /// `..` segments are dropped so lookups never leave a fixture root.
    pub fn new(raw_path: &str, method: HttpMethod, query: QueryParams) -> Self {
        let path = if raw_path.is_empty() || raw_path == "/" {
            "/index".to_string()
        } else {
            raw_path.to_string()
        };

        let decoded = match urlencoding::decode(&path) {
            Ok(d) => d.into_owned(),
            Err(_) => path.clone(),
        };
        let (logical, extension) = split_extension(&decoded);
        let extension = extension.unwrap_or(DEFAULT_EXTENSION).to_string();

        let segments = logical
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .map(str::to_string)
            .collect();

        Self {
            path,
            segments,
            method,
            query,
            extension,
        }
    }

    /// The path as it should be echoed back to clients.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Logical lookup path (`/users/5`), without extension.
    pub fn lookup_path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments of the directory holding the request's basename.
    pub fn parent_segments(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// Final path segment; empty when the lookup path is the root itself.
    pub fn basename(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether the effective extension is JSON (the native fixture format).
    pub fn is_json(&self) -> bool {
        self.extension.eq_ignore_ascii_case(DEFAULT_EXTENSION)
    }

    /// Path plus serialized query string, as shown in logs and history.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, serialize_query(&self.query))
        }
    }
}

// ============================================================================
// Resolved Fixture
// ============================================================================

/// A fixture file decoded into everything needed to answer a request.
#[derive(Debug, Clone)]
pub struct ResolvedFixture {
    pub path: PathBuf,
    /// Artificial latency in milliseconds, already clamped
    pub delay_ms: u64,
    /// HTTP status, already clamped
    pub status: u16,
    pub extension: String,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl ResolvedFixture {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure while loading the content of an already resolved fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in fixture: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FixtureError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            FixtureError::Read { path, .. } | FixtureError::MalformedJson { path, .. } => path,
        }
    }
}

/// Rejected overlay name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    #[error("overlay name must not be empty")]
    Empty,
    #[error("invalid overlay name '{0}': must be a single directory name")]
    InvalidName(String),
}
