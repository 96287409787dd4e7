//! Single-root fixture search.
//!
//! Within one root directory the tiers are tried in a fixed order and the
//! first hit wins:
//!
//! 1. query parameters: `<path>/[name=value]...`, then `<path>/[name]...`
//! 2. index: bare `<path>/index.<ext>`, then `<path>/index-...`
//! 3. exact: `<parent>/<basename>...`
//! 4. wildcard (JSON only): `<parent>/[*]...`
//!
//! Directory entries are sorted by filename before any predicate runs, so
//! when two files qualify for the same tier the lexically first one wins on
//! every platform.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::codec::{is_disabled, FixtureGrammar, NameShape};
use super::types::RequestDescriptor;

/// Priority levels of the search, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    QueryParam,
    Index,
    Exact,
    Wildcard,
}

impl Tier {
    pub const ORDER: [Tier; 4] = [Tier::QueryParam, Tier::Index, Tier::Exact, Tier::Wildcard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::QueryParam => "query",
            Tier::Index => "index",
            Tier::Exact => "exact",
            Tier::Wildcard => "wildcard",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one tier.
///
/// `Unreadable` is kept apart from `NoMatch` even though the search treats
/// both as "try the next tier".
#[derive(Debug)]
pub enum TierOutcome {
    Found(PathBuf),
    NoMatch,
    Unreadable { dir: PathBuf, source: io::Error },
}

/// A file selected by the search, with the tier that selected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: PathBuf,
    pub tier: Tier,
}

/// Fixture search inside a single root directory.
#[derive(Debug, Clone, Copy)]
pub struct DirectorySearch<'a> {
    root: &'a Path,
}

impl<'a> DirectorySearch<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// Run every tier in order and return the first hit.
    pub fn find(&self, request: &RequestDescriptor) -> Option<SearchHit> {
        for tier in Tier::ORDER {
            match self.run_tier(tier, request) {
                TierOutcome::Found(path) => {
                    debug!("Tier {} matched {}", tier, path.display());
                    return Some(SearchHit { path, tier });
                }
                TierOutcome::NoMatch => {}
                TierOutcome::Unreadable { dir, source } => {
                    debug!(
                        "Tier {} skipped unreadable directory {}: {}",
                        tier,
                        dir.display(),
                        source
                    );
                }
            }
        }
        None
    }

    /// Run a single tier.
    pub fn run_tier(&self, tier: Tier, request: &RequestDescriptor) -> TierOutcome {
        match tier {
            Tier::QueryParam => self.query_tier(request),
            Tier::Index => self.index_tier(request),
            Tier::Exact => self.exact_tier(request),
            Tier::Wildcard => self.wildcard_tier(request),
        }
    }

    fn query_tier(&self, request: &RequestDescriptor) -> TierOutcome {
        if request.query().is_empty() {
            return TierOutcome::NoMatch;
        }

        let dir = join_segments(self.root, request.segments());
        let entries = match list_fixture_files(&dir) {
            Ok(entries) => entries,
            Err(e) => return unreadable_or_missing(dir, e),
        };

        for shape in [NameShape::ExactQueryValue, NameShape::QueryPresence] {
            let Some(grammar) = compile(shape, request.extension()) else {
                continue;
            };
            if let Some(name) = entries
                .iter()
                .find(|name| grammar.accepts(name, request.method(), request.query()))
            {
                return TierOutcome::Found(dir.join(name));
            }
        }
        TierOutcome::NoMatch
    }

    fn index_tier(&self, request: &RequestDescriptor) -> TierOutcome {
        let dir = join_segments(self.root, request.segments());

        // The bare form answers every method.
        let bare = dir.join(format!("index.{}", request.extension()));
        if bare.is_file() {
            return TierOutcome::Found(bare);
        }

        let entries = match list_fixture_files(&dir) {
            Ok(entries) => entries,
            Err(e) => return unreadable_or_missing(dir, e),
        };
        let Some(grammar) = compile(NameShape::Index, request.extension()) else {
            return TierOutcome::NoMatch;
        };
        first_accepted(&dir, &entries, &grammar, request)
    }

    fn exact_tier(&self, request: &RequestDescriptor) -> TierOutcome {
        let basename = request.basename();
        if basename.is_empty() {
            return TierOutcome::NoMatch;
        }
        let dir = join_segments(self.root, request.parent_segments());

        // Non-JSON extensions only support the literal file name.
        if !request.is_json() {
            let file_name = format!("{}.{}", basename, request.extension());
            let path = dir.join(&file_name);
            return if !is_disabled(&file_name) && path.is_file() {
                TierOutcome::Found(path)
            } else {
                TierOutcome::NoMatch
            };
        }

        let entries = match list_fixture_files(&dir) {
            Ok(entries) => entries,
            Err(e) => return unreadable_or_missing(dir, e),
        };
        let Some(grammar) = compile(NameShape::ExactName(basename), request.extension()) else {
            return TierOutcome::NoMatch;
        };
        first_accepted(&dir, &entries, &grammar, request)
    }

    fn wildcard_tier(&self, request: &RequestDescriptor) -> TierOutcome {
        if !request.is_json() {
            return TierOutcome::NoMatch;
        }
        let dir = join_segments(self.root, request.parent_segments());
        let entries = match list_fixture_files(&dir) {
            Ok(entries) => entries,
            Err(e) => return unreadable_or_missing(dir, e),
        };
        let Some(grammar) = compile(NameShape::Wildcard, request.extension()) else {
            return TierOutcome::NoMatch;
        };
        first_accepted(&dir, &entries, &grammar, request)
    }
}

fn compile(shape: NameShape<'_>, extension: &str) -> Option<FixtureGrammar> {
    match FixtureGrammar::new(shape, extension) {
        Ok(grammar) => Some(grammar),
        Err(e) => {
            warn!("Could not build fixture pattern for {:?}: {}", shape, e);
            None
        }
    }
}

fn first_accepted(
    dir: &Path,
    entries: &[String],
    grammar: &FixtureGrammar,
    request: &RequestDescriptor,
) -> TierOutcome {
    entries
        .iter()
        .find(|name| grammar.accepts(name, request.method(), request.query()))
        .map(|name| TierOutcome::Found(dir.join(name)))
        .unwrap_or(TierOutcome::NoMatch)
}

fn unreadable_or_missing(dir: PathBuf, source: io::Error) -> TierOutcome {
    if source.kind() == io::ErrorKind::NotFound {
        TierOutcome::NoMatch
    } else {
        TierOutcome::Unreadable { dir, source }
    }
}

/// Join request path segments under a root.
pub fn join_segments(root: &Path, segments: &[String]) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

/// Names of the regular files in `dir`, sorted byte-wise.
///
/// Entries whose names are not valid UTF-8 cannot match any grammar and are
/// skipped.
pub fn list_fixture_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}
