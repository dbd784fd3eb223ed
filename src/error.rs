// src/error.rs
// =============================================================================
// Errors that end a run early.
//
// Broken links are NOT errors - they are data (`LinkStatus`) and the run keeps
// going. Only problems that make the run meaningless end up here: the docs
// directory cannot be listed, a document cannot be read, or the HTTP client
// cannot be built.
// =============================================================================

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to list documents in {}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read document {}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}
