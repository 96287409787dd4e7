//! Extension handling: content types, content classes, and request path
//! extension splitting.

/// Extension assumed when a request path carries none.
pub const DEFAULT_EXTENSION: &str = "json";

const DEFAULT_CONTENT_TYPE: &str = "application/json";

const MIME_TYPES: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("html", "text/html"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
    ("csv", "text/csv"),
    ("js", "application/javascript"),
    ("css", "text/css"),
];

const BINARY_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "pdf"];

/// How a fixture's bytes are loaded and sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Sent byte-for-byte
    Binary,
    /// Parsed and re-serialized; parse failures fail the request
    Json,
    /// Sent verbatim
    Text,
}

/// Content type for an extension. Unknown extensions map to JSON.
pub fn content_type_for(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

pub fn content_class(extension: &str) -> ContentClass {
    if extension.eq_ignore_ascii_case(DEFAULT_EXTENSION) {
        ContentClass::Json
    } else if BINARY_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
    {
        ContentClass::Binary
    } else {
        ContentClass::Text
    }
}

/// Split a trailing `.<alphanumeric>` extension off a request path.
///
/// `/users/report.csv` becomes (`/users/report`, `Some("csv")`); a path whose
/// last dot is followed by anything but ASCII alphanumerics has no extension.
pub fn split_extension(path: &str) -> (&str, Option<&str>) {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            (stem, Some(ext))
        }
        _ => (path, None),
    }
}
