//! Filesystem-backed fixture resolution.
//!
//! A request `{path, method, query}` is mapped onto a fixture file by probing
//! an optional overlay root and then the base root. Within a root, files are
//! matched by name through a small grammar of query, index, exact and
//! wildcard shapes with optional `-method-`, `-delay-` and `-status-`
//! suffixes.
//!
//! ## Module Structure
//!
//! - `types`: Request descriptor, resolved fixture, and error types
//! - `mime`: Extension to content type and content class mapping
//! - `codec`: Filename grammar and metadata extraction
//! - `search`: Tiered search inside a single root
//! - `resolver`: Overlay-then-base layering and overlay state
//! - `decoder`: Metadata clamping and content loading

mod codec;
mod decoder;
mod mime;
mod resolver;
mod search;
mod types;


pub use codec::{
    extract_metadata, file_stem, is_disabled, FixtureGrammar, FixtureName, NameShape,
    QueryConstraint, RawMetadata,
};
pub use decoder::{decode_fixture, FixtureMetadata, DEFAULT_STATUS, MAX_DELAY_MS};
pub use mime::{content_class, content_type_for, split_extension, ContentClass, DEFAULT_EXTENSION};
pub use resolver::{
    validate_overlay_name, LayeredResolver, OverlayState, Resolution, RootKind, SearchRoot,
    SearchRoots,
};
pub use search::{list_fixture_files, DirectorySearch, SearchHit, Tier, TierOutcome};
pub use types::{
    parse_query_string, serialize_query, FixtureError, HttpMethod, OverlayError, QueryParams,
    RequestDescriptor, ResolvedFixture,
};
