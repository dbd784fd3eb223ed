// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - markdown: Extracts links (with line/column) from document text
// - trust: Decides which hosts may receive the bearer token
// - http: Probes links over HTTP and classifies the result
//
// Everything here works on one link or one document's text at a time.
// Reading files and walking directories lives in `scan`.
// =============================================================================

mod http;
mod markdown;
mod trust;

// Re-export so callers write `checker::Verifier` instead of `checker::http::Verifier`
pub use http::{HttpTransport, LinkOutcome, LinkStatus, Transport, Verifier};
pub use markdown::{extract_links, Link, LinkKind};
pub use trust::TrustedHosts;
