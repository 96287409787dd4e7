//! Fixture tree linting library for the Mocklab mock server.
//!
//! Checks fixture filenames and content with the same grammar the server
//! uses to resolve requests, so problems show up before a request hits them.
//! It can be used as a library or through the `mocklab-lint` CLI binary.
//!
//! # Example
//!
//! ```no_run
//! use mocklab_lint::{lint_file, lint_tree, LintOptions};
//! use std::path::Path;
//!
//! // Lint a single fixture
//! let result = lint_file(Path::new("mocks/users/index.json"), &LintOptions::default());
//!
//! // Lint a whole fixture tree
//! let result = lint_tree(Path::new("./mocks"), &LintOptions::default());
//!
//! if result.has_errors() {
//!     eprintln!("Found {} errors", result.errors);
//! }
//! ```

mod types;
mod validator;

use mocklab_server::fixture::{is_disabled, list_fixture_files};
use std::path::Path;

// Re-export public types
pub use types::{LintIssue, LintOptions, LintResult, Severity};

// Re-export validation functions for advanced usage
pub use validator::{
    check_shadowing, classify, validate_content, validate_fixture_name, FixtureKey,
};

/// Lint a single fixture file.
///
/// Shadowing needs the rest of the directory and is only checked by
/// [`lint_directory`] and [`lint_tree`].
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        result.add_issue(LintIssue::error(
            "E001",
            "File name is not valid UTF-8",
            path.to_path_buf(),
        ));
        return result;
    };

    if is_disabled(file_name) {
        result.add_issue(
            LintIssue::info(
                "I001",
                "Disabled fixture (leading underscore) is never served",
                path.to_path_buf(),
            )
            .with_suggestion("Remove the leading _ to serve it"),
        );
        return result;
    }

    let Some((_, extension)) = file_name.rsplit_once('.') else {
        result.add_issue(
            LintIssue::warning(
                "W005",
                "File has no extension and is never served",
                path.to_path_buf(),
            )
            .with_suggestion("Add an extension such as .json"),
        );
        return result;
    };

    validator::validate_fixture_name(path, file_name, &mut result);

    if options.names_only {
        return result;
    }

    match std::fs::read(path) {
        Ok(content) => validator::validate_content(path, &content, extension, &mut result),
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read file: {e}"),
                path.to_path_buf(),
            ));
        }
    }

    result
}

/// Lint the fixture files of one directory (non-recursive).
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();

    let names = match list_fixture_files(path) {
        Ok(names) => names,
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read directory: {e}"),
                path.to_path_buf(),
            ));
            return result;
        }
    };

    for name in &names {
        result.merge(lint_file(&path.join(name), options));
    }
    validator::check_shadowing(path, &names, &mut result);

    result
}

/// Lint a fixture tree: `path` and every directory below it.
///
/// Symlinked directories are not followed, so link cycles terminate.
pub fn lint_tree(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = lint_directory(path, options);

    let mut subdirs: Vec<_> = match std::fs::read_dir(path) {
        Ok(entries) => entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.path())
            .collect(),
        Err(_) => return result,
    };
    subdirs.sort();

    for dir in subdirs {
        result.merge(lint_tree(&dir, options));
    }
    result
}
