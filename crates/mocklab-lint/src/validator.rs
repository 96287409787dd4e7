//! Core checks for fixture files: filename metadata, content, and fixtures
//! that can never be served because another file in the same directory wins.

use crate::types::{LintIssue, LintResult};
use mocklab_server::fixture::{
    content_class, extract_metadata, file_stem, is_disabled, ContentClass, FixtureGrammar,
    HttpMethod, NameShape, QueryConstraint, MAX_DELAY_MS,
};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

const MIN_STATUS: u64 = 100;
const MAX_STATUS: u64 = 599;
const MIN_FINAL_STATUS: u64 = 200;

static EXACT_NAME: OnceLock<Regex> = OnceLock::new();
static METHOD_SEGMENT: OnceLock<Regex> = OnceLock::new();

fn exact_name_regex() -> &'static Regex {
    EXACT_NAME.get_or_init(|| {
        Regex::new(
            r"(?i)^(?P<base>.+?)(?:-method-(?P<method>get|post|put|delete|patch))?(?:-delay-\d+)?(?:-status-\d+)?$",
        )
        .expect("valid exact-name pattern")
    })
}

fn method_segment_regex() -> &'static Regex {
    METHOD_SEGMENT
        .get_or_init(|| Regex::new(r"(?i)-method-([a-z]+)").expect("valid method pattern"))
}

/// Which requests a fixture file answers, as far as the search is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureKey {
    /// Base shape: `[id=5]`, `[id]`, `index`, `[*]` or an exact name
    pub shape: String,
    pub extension: String,
    /// `None` when the file answers every method: a bare `index.<ext>`, or a
    /// non-JSON exact name
    pub method: Option<HttpMethod>,
}

impl FixtureKey {
    fn is_bare_index(&self) -> bool {
        self.shape == "index" && self.method.is_none()
    }
}

/// Work out which shape, method and extension a filename declares.
///
/// Returns `None` for disabled files and names without an extension.
pub fn classify(file_name: &str) -> Option<FixtureKey> {
    if is_disabled(file_name) {
        return None;
    }
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    let ext = extension.to_ascii_lowercase();

    if stem == "index" {
        return Some(FixtureKey {
            shape: "index".to_string(),
            extension: ext,
            method: None,
        });
    }

    for shape in [
        NameShape::ExactQueryValue,
        NameShape::QueryPresence,
        NameShape::Index,
        NameShape::Wildcard,
    ] {
        let Ok(grammar) = FixtureGrammar::new(shape, extension) else {
            continue;
        };
        if let Some(parsed) = grammar.parse(file_name) {
            let shape = match parsed.query {
                Some(QueryConstraint::Equals { name, value }) => format!("[{name}={value}]"),
                Some(QueryConstraint::Present { name }) => format!("[{name}]"),
                None if shape == NameShape::Wildcard => "[*]".to_string(),
                None => "index".to_string(),
            };
            return Some(FixtureKey {
                shape,
                extension: ext,
                method: Some(parsed.method),
            });
        }
    }

    // Non-JSON exact names are looked up literally, suffixes and all.
    if content_class(&ext) != ContentClass::Json {
        return Some(FixtureKey {
            shape: stem.to_string(),
            extension: ext,
            method: None,
        });
    }

    let caps = exact_name_regex().captures(stem)?;
    let base = caps.name("base")?.as_str().to_ascii_lowercase();
    let method = caps
        .name("method")
        .and_then(|m| HttpMethod::parse(m.as_str()))
        .unwrap_or(HttpMethod::Get);
    Some(FixtureKey {
        shape: base,
        extension: ext,
        method: Some(method),
    })
}

/// Check the delay, status and method segments of a fixture filename.
pub fn validate_fixture_name(file: &Path, file_name: &str, result: &mut LintResult) {
    let stem = file_stem(file_name);
    let raw = extract_metadata(stem);

    if let Some(status) = raw.status {
        if !(MIN_STATUS..=MAX_STATUS).contains(&status) {
            result.add_issue(
                LintIssue::error(
                    "E003",
                    format!("Status {status} is outside 100-599; the server answers 200 instead"),
                    file.to_path_buf(),
                )
                .with_location("status")
                .with_suggestion("Use a status code between 200 and 599"),
            );
        } else if status < MIN_FINAL_STATUS {
            result.add_issue(
                LintIssue::error(
                    "E004",
                    format!("Informational status {status} cannot end a response; the server answers 200 instead"),
                    file.to_path_buf(),
                )
                .with_location("status")
                .with_suggestion("Use a status code between 200 and 599"),
            );
        }
    }

    if let Some(delay) = raw.delay_ms {
        if delay > MAX_DELAY_MS {
            result.add_issue(
                LintIssue::warning(
                    "W001",
                    format!("Delay {delay}ms exceeds 10 minutes and is capped at {MAX_DELAY_MS}ms"),
                    file.to_path_buf(),
                )
                .with_location("delay")
                .with_suggestion(format!("Use a delay of at most {MAX_DELAY_MS}ms")),
            );
        }
    }

    check_suffix_order(file, stem, result);

    if let Some(caps) = method_segment_regex().captures(stem) {
        let method = &caps[1];
        if HttpMethod::parse(method).is_none() {
            result.add_issue(
                LintIssue::warning(
                    "W004",
                    format!("Unsupported method '{method}'; the segment is read as part of the name"),
                    file.to_path_buf(),
                )
                .with_location("method")
                .with_suggestion("Use one of get, post, put, delete, patch"),
            );
        }
    }
}

/// Suffix segments only take effect in the order method, delay, status.
fn check_suffix_order(file: &Path, stem: &str, result: &mut LintResult) {
    let lower = stem.to_ascii_lowercase();
    let positions: Vec<usize> = ["-method-", "-delay-", "-status-"]
        .iter()
        .filter_map(|segment| lower.find(segment))
        .collect();

    if positions.windows(2).any(|pair| pair[0] > pair[1]) {
        result.add_issue(
            LintIssue::warning(
                "W003",
                "Suffix segments are out of order and are read as part of the name",
                file.to_path_buf(),
            )
            .with_location("suffix")
            .with_suggestion("Order suffixes as -method-<m>-delay-<ms>-status-<code>"),
        );
    }
}

/// Check that fixture content can be served.
pub fn validate_content(file: &Path, content: &[u8], extension: &str, result: &mut LintResult) {
    if content_class(extension) != ContentClass::Json {
        return;
    }
    if let Err(e) = serde_json::from_slice::<Value>(content) {
        result.add_issue(
            LintIssue::error("E002", format!("Invalid JSON: {e}"), file.to_path_buf())
                .with_suggestion("Check for JSON syntax errors; the server answers 500"),
        );
    }
}

/// Report files that lose to another file in the same directory.
///
/// `names` must be sorted the way the server sorts directory entries.
pub fn check_shadowing(dir: &Path, names: &[String], result: &mut LintResult) {
    // Directories are small; keep groups in first-seen order.
    let mut groups: Vec<(FixtureKey, Vec<&str>)> = Vec::new();
    for name in names {
        let Some(key) = classify(name) else {
            continue;
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, files)) => files.push(name),
            None => groups.push((key, vec![name])),
        }
    }

    for (key, files) in &groups {
        let winner = files[0];
        for loser in &files[1..] {
            result.add_issue(
                LintIssue::warning(
                    "W002",
                    format!("Never served: {winner} matches the same requests and sorts first"),
                    dir.join(loser),
                )
                .with_location(key.shape.clone())
                .with_suggestion(format!("Remove one of {winner} and {loser}, or prefix one with _")),
            );
        }
    }

    // A bare index answers every method before decorated index files are
    // considered.
    for (bare, bare_files) in groups.iter().filter(|(k, _)| k.is_bare_index()) {
        for (key, files) in &groups {
            if key.shape == "index" && key.extension == bare.extension && key.method.is_some() {
                result.add_issue(
                    LintIssue::warning(
                        "W002",
                        format!(
                            "Never served: {} answers every method first",
                            bare_files[0]
                        ),
                        dir.join(files[0]),
                    )
                    .with_location("index")
                    .with_suggestion("Give the bare index a method segment, or remove it"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn names(list: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        v.sort();
        v
    }

    fn codes(result: &LintResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn test_classify_shapes() {
        let key = classify("[id=5]-status-404.json").unwrap();
        assert_eq!(key.shape, "[id=5]");
        assert_eq!(key.method, Some(HttpMethod::Get));

        let key = classify("[id]-method-post.json").unwrap();
        assert_eq!(key.shape, "[id]");
        assert_eq!(key.method, Some(HttpMethod::Post));

        let key = classify("index.json").unwrap();
        assert_eq!(key.shape, "index");
        assert_eq!(key.method, None);

        let key = classify("index-method-put.json").unwrap();
        assert_eq!(key.shape, "index");
        assert_eq!(key.method, Some(HttpMethod::Put));

        let key = classify("[*]-delay-10.json").unwrap();
        assert_eq!(key.shape, "[*]");

        let key = classify("users-method-delete-delay-5.JSON").unwrap();
        assert_eq!(key.shape, "users");
        assert_eq!(key.extension, "json");
        assert_eq!(key.method, Some(HttpMethod::Delete));

        assert!(classify("_users.json").is_none());
        assert!(classify("README").is_none());
    }

    #[test]
    fn test_status_out_of_range_is_error() {
        let mut result = LintResult::new();
        validate_fixture_name(Path::new("a.json"), "a-status-700.json", &mut result);
        assert_eq!(codes(&result), vec!["E003"]);

        let mut result = LintResult::new();
        validate_fixture_name(Path::new("a.json"), "a-status-201.json", &mut result);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_informational_status_is_error() {
        let mut result = LintResult::new();
        validate_fixture_name(Path::new("a.json"), "hello-status-100.json", &mut result);
        assert_eq!(codes(&result), vec!["E004"]);
        assert!(result.issues[0].message.contains("200"));
    }

    #[test]
    fn test_long_delay_is_warning() {
        let mut result = LintResult::new();
        validate_fixture_name(Path::new("a.json"), "a-delay-600001.json", &mut result);
        assert_eq!(codes(&result), vec!["W001"]);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_suffix_order() {
        let mut result = LintResult::new();
        validate_fixture_name(
            Path::new("a.json"),
            "a-status-404-delay-10.json",
            &mut result,
        );
        assert_eq!(codes(&result), vec!["W003"]);

        let mut result = LintResult::new();
        validate_fixture_name(
            Path::new("a.json"),
            "a-method-post-delay-10-status-201.json",
            &mut result,
        );
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_unsupported_method() {
        let mut result = LintResult::new();
        validate_fixture_name(Path::new("a.json"), "a-method-head.json", &mut result);
        assert_eq!(codes(&result), vec!["W004"]);
    }

    #[test]
    fn test_invalid_json_content() {
        let mut result = LintResult::new();
        validate_content(Path::new("a.json"), b"{ nope", "json", &mut result);
        assert_eq!(codes(&result), vec!["E002"]);

        let mut result = LintResult::new();
        validate_content(Path::new("a.xml"), b"{ nope", "xml", &mut result);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_shadowed_exact_fixtures() {
        let mut result = LintResult::new();
        let dir = PathBuf::from("mocks/api");
        check_shadowing(
            &dir,
            &names(&["users.json", "users-delay-10.json", "users-method-post.json"]),
            &mut result,
        );
        assert_eq!(codes(&result), vec!["W002"]);
        assert_eq!(result.issues[0].file, dir.join("users.json"));
        assert!(result.issues[0].message.contains("users-delay-10.json"));
    }

    #[test]
    fn test_non_json_exact_names_are_literal() {
        let key = classify("users-method-post-delay-5.xml").unwrap();
        assert_eq!(key.shape, "users-method-post-delay-5");
        assert_eq!(key.method, None);

        let mut result = LintResult::new();
        check_shadowing(
            Path::new("mocks"),
            &names(&["users.xml", "users-delay-5.xml", "users-status-404.txt"]),
            &mut result,
        );
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_bare_index_shadows_decorated_index() {
        let mut result = LintResult::new();
        check_shadowing(
            Path::new("mocks/users"),
            &names(&["index.json", "index-method-post.json", "index.xml"]),
            &mut result,
        );
        assert_eq!(codes(&result), vec!["W002"]);
        assert!(result.issues[0]
            .file
            .ends_with("index-method-post.json"));
    }

    #[test]
    fn test_distinct_fixtures_do_not_shadow() {
        let mut result = LintResult::new();
        check_shadowing(
            Path::new("mocks/users"),
            &names(&[
                "[id=5].json",
                "[id=6].json",
                "[id].json",
                "index-method-post.json",
                "index-method-put.json",
                "_index.json",
            ]),
            &mut result,
        );
        assert!(result.issues.is_empty());
    }
}
