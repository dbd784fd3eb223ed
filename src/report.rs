// src/report.rs
// =============================================================================
// Everything the user sees on the console.
//
// Output streams:
// - Passing links and the final "all good" line go to stdout
// - Failing links, placeholders and the failure summary go to stderr
// - With --json, stdout carries ONLY the JSON report, so every human line
//   moves to stderr
// - With --github-annotations, each failure is also printed as a GitHub
//   Actions `::error` workflow command so it shows up inline on the PR
// =============================================================================

use crate::checker::{LinkKind, LinkOutcome};
use crate::config::OutputFormat;
use crate::scan::RunResult;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct Console {
    format: OutputFormat,
    annotations: bool,
}

impl Console {
    pub fn new(format: OutputFormat, annotations: bool) -> Self {
        Console { format, annotations }
    }

    // Informational lines must not end up inside the JSON on stdout
    fn info(&self, line: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", line),
            OutputFormat::Json => eprintln!("{}", line),
        }
    }

    pub fn banner(&self, docs_path: &Path) {
        self.info(&format!("🔍 Checking links in {}", docs_path.display()));
    }

    /// One line per checked link. Placeholders are reported per document instead.
    pub fn link(&self, outcome: &LinkOutcome) {
        if outcome.link.kind == LinkKind::EmptyImage {
            return;
        }

        let location = format!("{}:{}", outcome.link.document.display(), outcome.link.line);
        if outcome.is_ok() {
            self.info(&format!("✅ {} ({})", outcome.link.target, location));
        } else {
            eprintln!(
                "❌ {} ({}) ({})",
                outcome.link.target,
                location,
                outcome.reason()
            );
        }
    }

    /// Lists the empty image links of one document, if any
    pub fn placeholders(&self, document: &Path, outcomes: &[LinkOutcome]) {
        let placeholders: Vec<&LinkOutcome> = outcomes
            .iter()
            .filter(|outcome| outcome.link.kind == LinkKind::EmptyImage)
            .collect();

        if placeholders.is_empty() {
            return;
        }

        eprintln!("Empty image links found in {}:", document.display());
        for outcome in placeholders {
            eprintln!("   line {}: {}", outcome.link.line, outcome.link.target);
        }
    }

    /// Prints the end-of-run report
    pub fn summary(&self, result: &RunResult) -> Result<()> {
        if self.annotations {
            for failure in &result.failures {
                self.info(&annotation(failure));
            }
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            OutputFormat::Text => print_summary(result),
        }

        Ok(())
    }
}

fn print_summary(result: &RunResult) {
    let broken = result.failures.len();
    let ok = result.total_links - broken;

    println!();
    println!("📊 Summary:");
    println!("   📄 Documents: {}", result.documents);
    println!("   ✅ OK: {}", ok);
    println!("   ❌ Broken: {}", broken);
    println!("   📋 Total: {}", result.total_links);
    println!();

    if result.is_success() {
        println!("All links checked successfully.");
    } else {
        eprintln!("Failing links:");
        for failure in &result.failures {
            eprintln!("   {}", format_failure(failure));
        }
        eprintln!("Some links failed the check.");
    }
}

/// `docs/guide.md:12:5 https://example.com/404 (Status: 404)`
pub fn format_failure(outcome: &LinkOutcome) -> String {
    format!(
        "{}:{}:{} {} ({})",
        outcome.link.document.display(),
        outcome.link.line,
        outcome.link.column,
        outcome.link.target,
        outcome.reason()
    )
}

/// `::error file=docs/guide.md,line=12,col=5::Status: 404: https://example.com/404`
pub fn annotation(outcome: &LinkOutcome) -> String {
    format!(
        "::error file={},line={},col={}::{}",
        escape_property(&outcome.link.document.display().to_string()),
        outcome.link.line,
        outcome.link.column,
        escape_data(&format!("{}: {}", outcome.reason(), outcome.link.target))
    )
}

// Workflow command escaping, as done by @actions/core
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
