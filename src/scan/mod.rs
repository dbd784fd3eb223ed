// src/scan/mod.rs
// =============================================================================
// This module drives a whole run over the docs directory.
//
// Submodules:
// - document: Reads one document and verifies every link in it
// - run: Lists the documents, scans each one, and builds the RunResult
//
// How it fits together:
//   RunCoordinator -> DocumentScanner (per document) -> checker::extract_links
//                  -> checker::Verifier (per link)   -> RunResult
// =============================================================================

mod document;
mod run;

pub use document::DocumentScanner;
pub use run::{RunCoordinator, RunResult};
