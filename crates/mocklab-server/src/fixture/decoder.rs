//! Response metadata and content decoding for resolved fixtures.

use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use super::codec::{extract_metadata, file_stem};
use super::mime::{content_class, content_type_for, ContentClass};
use super::types::{FixtureError, ResolvedFixture};
use crate::metrics;

/// Longest artificial delay a fixture may request (10 minutes).
pub const MAX_DELAY_MS: u64 = 600_000;

pub const DEFAULT_STATUS: u16 = 200;

const MIN_STATUS: u64 = 100;
const MAX_STATUS: u64 = 599;
/// First status hyper can send as a final HTTP/1 response.
const MIN_FINAL_STATUS: u64 = 200;

/// Delay and status decoded from a fixture filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureMetadata {
    pub delay_ms: u64,
    pub status: u16,
}

impl Default for FixtureMetadata {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            status: DEFAULT_STATUS,
        }
    }
}

impl FixtureMetadata {
    /// Decode metadata from a filename, clamping out-of-range values.
    ///
    /// A delay above [`MAX_DELAY_MS`] is capped; a status outside 100-599
    /// falls back to 200. Informational 1xx codes cannot end an exchange and
    /// also fall back to 200. Every correction emits a warning.
    pub fn from_file_name(file_name: &str) -> Self {
        let raw = extract_metadata(file_stem(file_name));

        let mut delay_ms = raw.delay_ms.unwrap_or(0);
        if delay_ms > MAX_DELAY_MS {
            warn!(
                "Delay {}ms exceeds maximum of 10 minutes. Using {}ms instead.",
                delay_ms, MAX_DELAY_MS
            );
            metrics::record_metadata_correction("delay");
            delay_ms = MAX_DELAY_MS;
        }

        let status = match raw.status {
            None => DEFAULT_STATUS,
            Some(code) if (MIN_FINAL_STATUS..=MAX_STATUS).contains(&code) => code as u16,
            Some(code) if (MIN_STATUS..MIN_FINAL_STATUS).contains(&code) => {
                warn!(
                    "Informational status code {} cannot be sent as a final response. Using {} instead.",
                    code, DEFAULT_STATUS
                );
                metrics::record_metadata_correction("status");
                DEFAULT_STATUS
            }
            Some(code) => {
                warn!(
                    "Invalid status code {}. Using {} instead.",
                    code, DEFAULT_STATUS
                );
                metrics::record_metadata_correction("status");
                DEFAULT_STATUS
            }
        };

        Self { delay_ms, status }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Load a resolved fixture: metadata from its name, content by extension
/// class.
///
/// JSON fixtures are parsed and re-serialized compactly, so a malformed file
/// fails here instead of reaching the client.
pub fn decode_fixture(path: &Path, extension: &str) -> Result<ResolvedFixture, FixtureError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata = FixtureMetadata::from_file_name(&file_name);

    let raw = std::fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let body = match content_class(extension) {
        ContentClass::Binary | ContentClass::Text => Bytes::from(raw),
        ContentClass::Json => {
            let value: serde_json::Value =
                serde_json::from_slice(&raw).map_err(|source| FixtureError::MalformedJson {
                    path: path.to_path_buf(),
                    source,
                })?;
            // Serializing a Value cannot fail
            Bytes::from(serde_json::to_vec(&value).unwrap_or(raw))
        }
    };

    Ok(ResolvedFixture {
        path: path.to_path_buf(),
        delay_ms: metadata.delay_ms,
        status: metadata.status,
        extension: extension.to_string(),
        content_type: content_type_for(extension),
        body,
    })
}
