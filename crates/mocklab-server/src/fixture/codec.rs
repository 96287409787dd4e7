//! Fixture filename grammar.
//!
//! A fixture name is a base followed by optional, ordered suffix segments and
//! an extension:
//!
//! ```text
//! <base>(-method-<get|post|put|delete|patch>)?(-delay-<digits>)?(-status-<digits>)?.<ext>
//! ```
//!
//! The base takes one of five shapes, each tried by a different search tier:
//!
//! - `[name=value]` - exact query value
//! - `[name]` - query parameter presence (`name` is never `*`)
//! - `index` - directory index
//! - `[*]` - wildcard
//! - the request basename itself
//!
//! The suffix grammar and extension are matched case-insensitively. Names
//! starting with `_` are disabled and never parse.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

use super::types::{HttpMethod, QueryParams};

const SUFFIX_GRAMMAR: &str =
    r"(?:-method-(?P<method>get|post|put|delete|patch))?(?:-delay-\d+)?(?:-status-\d+)?";

static DELAY_REGEX: OnceLock<Regex> = OnceLock::new();
static STATUS_REGEX: OnceLock<Regex> = OnceLock::new();

fn delay_regex() -> &'static Regex {
    DELAY_REGEX.get_or_init(|| Regex::new(r"(?i)-delay-(\d+)").expect("valid delay pattern"))
}

fn status_regex() -> &'static Regex {
    STATUS_REGEX.get_or_init(|| Regex::new(r"(?i)-status-(\d+)").expect("valid status pattern"))
}

/// The base shape a grammar recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameShape<'a> {
    /// `[name=value]`
    ExactQueryValue,
    /// `[name]`
    QueryPresence,
    /// `index`
    Index,
    /// `[*]`
    Wildcard,
    /// Literal request basename
    ExactName(&'a str),
}

impl NameShape<'_> {
    fn base_pattern(&self) -> String {
        match self {
            NameShape::ExactQueryValue => r"\[(?P<name>[^=\]]+)=(?P<value>[^\]]+)\]".to_string(),
            NameShape::QueryPresence => r"\[(?P<name>[^\]=]+)\]".to_string(),
            NameShape::Index => "index".to_string(),
            NameShape::Wildcard => r"\[\*\]".to_string(),
            NameShape::ExactName(base) => regex::escape(base),
        }
    }
}

/// Query condition carried by a bracket-shaped fixture name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryConstraint {
    /// Parameter present with exactly this value
    Equals { name: String, value: String },
    /// Parameter present with any value
    Present { name: String },
}

impl QueryConstraint {
    pub fn is_satisfied_by(&self, query: &QueryParams) -> bool {
        match self {
            QueryConstraint::Equals { name, value } => query.get(name) == Some(value),
            QueryConstraint::Present { name } => query.contains_key(name),
        }
    }

    pub fn param_name(&self) -> &str {
        match self {
            QueryConstraint::Equals { name, .. } | QueryConstraint::Present { name } => name,
        }
    }
}

/// A filename accepted by a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureName {
    /// Method the fixture answers (GET when the name has no method segment)
    pub method: HttpMethod,
    pub query: Option<QueryConstraint>,
}

impl FixtureName {
    /// Whether this fixture answers a request with the given method and query.
    pub fn accepts(&self, method: HttpMethod, query: &QueryParams) -> bool {
        self.method == method
            && self
                .query
                .as_ref()
                .map_or(true, |constraint| constraint.is_satisfied_by(query))
    }
}

/// Compiled grammar for one base shape and one extension.
#[derive(Debug, Clone)]
pub struct FixtureGrammar {
    regex: Regex,
    presence: bool,
}

impl FixtureGrammar {
    /// Compile the grammar for `shape`, terminated by `.<extension>`.
    pub fn new(shape: NameShape<'_>, extension: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            "^{}{}\\.{}$",
            shape.base_pattern(),
            SUFFIX_GRAMMAR,
            regex::escape(extension)
        );
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            regex,
            presence: matches!(shape, NameShape::QueryPresence),
        })
    }

    /// Parse a filename, returning `None` when it does not fit the grammar or
    /// is disabled.
    pub fn parse(&self, file_name: &str) -> Option<FixtureName> {
        if is_disabled(file_name) {
            return None;
        }
        let caps = self.regex.captures(file_name)?;

        let method = caps
            .name("method")
            .and_then(|m| HttpMethod::parse(m.as_str()))
            .unwrap_or(HttpMethod::Get);

        let query = match (caps.name("name"), caps.name("value")) {
            (Some(name), Some(value)) => Some(QueryConstraint::Equals {
                name: name.as_str().to_string(),
                value: value.as_str().to_string(),
            }),
            (Some(name), None) => {
                if self.presence && name.as_str() == "*" {
                    return None;
                }
                Some(QueryConstraint::Present {
                    name: name.as_str().to_string(),
                })
            }
            _ => None,
        };

        Some(FixtureName { method, query })
    }

    /// Parse and check against the request in one step.
    pub fn accepts(&self, file_name: &str, method: HttpMethod, query: &QueryParams) -> bool {
        self.parse(file_name)
            .is_some_and(|name| name.accepts(method, query))
    }
}

/// Files starting with `_` are disabled or partial fixtures.
pub fn is_disabled(file_name: &str) -> bool {
    file_name.starts_with('_')
}

/// Filename without its final extension.
pub fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// Delay and status numbers as written in a filename, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMetadata {
    pub delay_ms: Option<u64>,
    pub status: Option<u64>,
}

/// Extract `-delay-N` and `-status-N` from anywhere in a stem.
///
/// Digit runs too long for `u64` saturate so that clamping still applies.
pub fn extract_metadata(stem: &str) -> RawMetadata {
    let number = |re: &Regex| {
        re.captures(stem)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
    };
    RawMetadata {
        delay_ms: number(delay_regex()),
        status: number(status_regex()),
    }
}
