//! Bounded log of recently served requests.
//!
//! Entries are kept most recent first. Appending and truncating happen under
//! a single lock so concurrent requests never observe more than `limit`
//! entries.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One served request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHistoryEntry {
    /// Path plus serialized query string
    pub uri: String,
    pub method: String,
    /// Display path of the fixture (`/mocks/...` or `/overlays/<name>/...`)
    pub file_path: Option<String>,
    pub error: bool,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl RequestHistoryEntry {
    pub fn new(
        uri: impl Into<String>,
        method: impl Into<String>,
        file_path: Option<String>,
        error: bool,
    ) -> Self {
        Self {
            uri: uri.into(),
            method: method.into(),
            file_path,
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Destination for request history events.
pub trait HistorySink: Send + Sync {
    fn record(&self, entry: RequestHistoryEntry);
}

/// In-memory, most-recent-first request history.
#[derive(Debug)]
pub struct RequestHistory {
    entries: Mutex<VecDeque<RequestHistoryEntry>>,
    limit: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl RequestHistory {
    /// A limit of zero keeps nothing.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(limit.min(1024))),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Copy of the current entries, most recent first.
    pub fn snapshot(&self) -> Vec<RequestHistoryEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }
}

impl HistorySink for RequestHistory {
    fn record(&self, entry: RequestHistoryEntry) {
        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.limit);
    }
}
