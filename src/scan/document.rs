// src/scan/document.rs
// =============================================================================
// Scans a single document.
//
// Steps:
// 1. Read the file (an I/O failure here is fatal for the whole run)
// 2. Extract links with their positions
// 3. Verify all of them concurrently, at most `concurrency` at a time
// 4. Hand back the outcomes in document order
//
// `buffered` (not `buffer_unordered`) keeps results in input order, so the
// final report is stable no matter which server answers first. The console
// lines are printed as probes finish and may interleave.
// =============================================================================

use crate::checker::{extract_links, LinkOutcome, Transport, Verifier};
use crate::error::ScanError;
use crate::report::Console;
use futures::stream::{self, StreamExt};
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub struct DocumentScanner<T> {
    verifier: Verifier<T>,
    concurrency: usize,
    console: Console,
}

impl<T: Transport> DocumentScanner<T> {
    pub fn new(verifier: Verifier<T>, concurrency: usize, console: Console) -> Self {
        DocumentScanner {
            verifier,
            // A zero limit would never poll anything
            concurrency: concurrency.max(1),
            console,
        }
    }

    /// Reads `path` and checks every link in it
    pub async fn scan_document(&self, path: &Path) -> Result<Vec<LinkOutcome>, ScanError> {
        let bytes = fs::read(path)
            .await
            .map_err(|source| ScanError::ReadDocument {
                path: path.to_path_buf(),
                source,
            })?;

        // Invalid UTF-8 becomes U+FFFD; only I/O failures are fatal
        let text = String::from_utf8_lossy(&bytes);

        Ok(self.scan_text(path, &text).await)
    }

    /// Checks every link in already-loaded text
    pub async fn scan_text(&self, path: &Path, text: &str) -> Vec<LinkOutcome> {
        let links = extract_links(path, text);
        debug!(document = %path.display(), links = links.len(), "extracted links");

        let outcomes: Vec<LinkOutcome> = stream::iter(links)
            .map(|link| async move {
                let outcome = self.verifier.verify(link).await;
                self.console.link(&outcome);
                outcome
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        self.console.placeholders(path, &outcomes);

        outcomes
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffered vs buffer_unordered
//    - Both run up to N futures at once
//    - buffer_unordered yields results as they finish
//    - buffered yields them in the order they went in, which is what a
//      reproducible report needs
//
// 2. Why `async move` inside map()?
//    - Each link becomes its own future that owns the Link
//    - `self` is only a reference, so moving it into the future is a cheap copy
// -----------------------------------------------------------------------------
