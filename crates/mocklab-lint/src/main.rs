//! Mocklab Fixture Linter CLI
//!
//! Checks a fixture tree for files the server will reject, misread or never
//! serve, before a request runs into them.
//!
//! Usage:
//!   mocklab-lint <directory_or_file> [OPTIONS]

use clap::Parser;
use mocklab_lint::{lint_file, lint_tree, LintIssue, LintOptions, LintResult, Severity};
use std::path::PathBuf;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Mocklab Fixture Linter
#[derive(Parser, Debug)]
#[command(name = "mocklab-lint")]
#[command(author, version, about = "Validate Mocklab fixture trees")]
struct Args {
    /// Fixture file, or directory to walk recursively
    #[arg(required = true)]
    path: PathBuf,

    /// Output format: text (default), json
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,

    /// Check filenames only, without reading file contents
    #[arg(short = 'n', long)]
    names_only: bool,
}

fn main() {
    let args = Args::parse();
    let json_output = args.output == "json";

    let options = LintOptions {
        verbose: args.verbose,
        names_only: args.names_only,
    };

    if !args.path.exists() {
        eprintln!("{RED}Error:{RESET} {} does not exist", args.path.display());
        std::process::exit(2);
    }

    let result = if args.path.is_file() {
        lint_file(&args.path, &options)
    } else {
        lint_tree(&args.path, &options)
    };

    if json_output {
        print_results_json(&result);
    } else {
        println!("{BOLD}{CYAN}Mocklab Fixture Linter{RESET}");
        println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
        println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());
        if result.files_checked == 0 {
            println!(
                "{YELLOW}Warning:{RESET} No fixture files found in {}",
                args.path.display()
            );
        }
        print_results(&result, &args);
    }

    std::process::exit(if result.fails(args.strict) { 1 } else { 0 });
}

fn print_results_json(result: &LintResult) {
    match serde_json::to_string_pretty(result) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{RED}Error serializing results: {e}{RESET}");
            std::process::exit(2);
        }
    }
}

fn print_results(result: &LintResult, args: &Args) {
    println!();

    let mut issues: Vec<_> = result.issues.iter().filter(|i| shown(i, args)).collect();
    issues.sort_by(|a, b| a.file.cmp(&b.file));

    let mut current: Option<&PathBuf> = None;
    for issue in issues {
        if current != Some(&issue.file) {
            println!("{BOLD}{CYAN}{}{RESET}", issue.file.display());
            current = Some(&issue.file);
        }
        let color = severity_color(&issue.severity);
        let location = issue
            .location
            .as_ref()
            .map(|l| format!("{DIM}[{l}]{RESET} "))
            .unwrap_or_default();
        println!(
            "  {color}{}{RESET} {location}{} {DIM}({}){RESET}",
            issue.severity.label(),
            issue.message,
            issue.code
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("    {GREEN}-> {suggestion}{RESET}");
        }
    }
    if current.is_some() {
        println!();
    }

    println!(
        "{DIM}Fixtures checked:{RESET} {}  {RED}errors:{RESET} {}  {YELLOW}warnings:{RESET} {}",
        result.files_checked, result.errors, result.warnings
    );
    println!("{}", verdict(result, args.strict));
}

/// Whether an issue is printed under the `--errors-only` and `--verbose` flags.
fn shown(issue: &LintIssue, args: &Args) -> bool {
    match issue.severity {
        Severity::Error => true,
        Severity::Warning => !args.errors_only,
        Severity::Info => args.verbose && !args.errors_only,
    }
}

fn verdict(result: &LintResult, strict: bool) -> String {
    if result.errors == 0 && result.warnings == 0 {
        format!("{GREEN}{BOLD}All fixtures pass{RESET}")
    } else if result.fails(strict) {
        format!("{RED}{BOLD}Linting failed{RESET}")
    } else {
        format!("{YELLOW}{BOLD}Passed with warnings{RESET}")
    }
}

fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    }
}
