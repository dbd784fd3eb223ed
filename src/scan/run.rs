// src/scan/run.rs
// =============================================================================
// Coordinates one run over the docs directory.
//
// What happens here:
// 1. List the directory (optionally recursing) and keep document files
// 2. Sort them so every run visits documents in the same order
// 3. Scan each document and fold its outcomes into a RunResult
//
// The RunResult is the only place failures are collected. There is no global
// "something failed" flag; the caller asks the result for the exit code.
// =============================================================================

use crate::checker::{HttpTransport, LinkOutcome, Transport, Verifier};
use crate::config::Config;
use crate::error::ScanError;
use crate::report::Console;
use crate::scan::DocumentScanner;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

/// Aggregate of a whole run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunResult {
    /// Documents scanned
    pub documents: usize,
    /// Links found across all documents (placeholders included)
    pub total_links: usize,
    /// Every outcome that was not Ok, in document then line order
    pub failures: Vec<LinkOutcome>,
}

impl RunResult {
    /// Folds one document's outcomes into the total
    pub fn record(&mut self, outcomes: Vec<LinkOutcome>) {
        self.documents += 1;
        self.total_links += outcomes.len();
        self.failures
            .extend(outcomes.into_iter().filter(|outcome| !outcome.is_ok()));
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 when nothing failed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct RunCoordinator<T> {
    config: Config,
    scanner: DocumentScanner<T>,
}

impl RunCoordinator<HttpTransport> {
    /// Wires up the real HTTP transport from configuration
    pub fn from_config(config: Config) -> Result<Self, ScanError> {
        let transport = HttpTransport::new(config.timeout)?;
        let verifier = Verifier::new(
            transport,
            config.credential.clone(),
            config.trusted_hosts.clone(),
        )
        .with_get_fallback(config.get_fallback);
        let console = Console::new(config.output, config.github_annotations);
        let scanner = DocumentScanner::new(verifier, config.concurrency, console);

        Ok(RunCoordinator::new(config, scanner))
    }
}

impl<T: Transport> RunCoordinator<T> {
    pub fn new(config: Config, scanner: DocumentScanner<T>) -> Self {
        RunCoordinator { config, scanner }
    }

    // Lists document files under the configured directory
    //
    // Returns: paths sorted lexically. Directories are only entered with
    // `recursive`; anything that cannot be listed aborts the run.
    pub async fn list_documents(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut documents = Vec::new();
        let mut pending = vec![self.config.docs_path.clone()];

        while let Some(dir) = pending.pop() {
            let list_error = |source: std::io::Error| ScanError::ListDirectory {
                path: dir.clone(),
                source,
            };

            let mut entries = fs::read_dir(&dir).await.map_err(list_error)?;
            while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(list_error)?;

                if file_type.is_dir() {
                    if self.config.recursive {
                        pending.push(path);
                    }
                } else if self.config.is_document(&path) {
                    documents.push(path);
                }
            }
        }

        documents.sort();
        Ok(documents)
    }

    /// Scans every document and returns the aggregate
    pub async fn run(&self) -> Result<RunResult, ScanError> {
        let documents = self.list_documents().await?;

        if documents.is_empty() {
            warn!(path = %self.config.docs_path.display(), "no documents found");
        } else {
            info!(
                path = %self.config.docs_path.display(),
                documents = documents.len(),
                "scanning documents"
            );
        }

        let mut result = RunResult::default();
        for document in &documents {
            let outcomes = self.scanner.scan_document(document).await?;
            result.record(outcomes);
        }

        Ok(result)
    }
}
