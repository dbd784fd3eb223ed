// src/config.rs
// =============================================================================
// The resolved run configuration.
//
// `cli.rs` parses flags and environment variables; this module holds the
// validated result that the rest of the program reads. Nothing in here
// changes once the run has started.
// =============================================================================

use crate::checker::TrustedHosts;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Bearer token used for trusted hosts
///
/// Debug output never shows the secret, so a Config can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns None for a blank token
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Credential(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// How the final report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the documents
    pub docs_path: PathBuf,
    /// Extensions (without the dot) that mark a file as a document
    pub extensions: Vec<String>,
    pub recursive: bool,
    /// Present only when the token is enabled and non-blank
    pub credential: Option<Credential>,
    pub trusted_hosts: TrustedHosts,
    /// Per-probe timeout
    pub timeout: Duration,
    /// Max in-flight probes per document
    pub concurrency: usize,
    pub get_fallback: bool,
    pub output: OutputFormat,
    pub github_annotations: bool,
}

impl Config {
    /// True if `name` ends in one of the configured document extensions
    pub fn is_document(&self, name: &std::path::Path) -> bool {
        name.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            docs_path: PathBuf::from("./docs"),
            extensions: vec!["md".to_string()],
            recursive: false,
            credential: None,
            trusted_hosts: TrustedHosts::default(),
            timeout: Duration::from_secs(10),
            concurrency: 50,
            get_fallback: false,
            output: OutputFormat::Text,
            github_annotations: false,
        }
    }
}
