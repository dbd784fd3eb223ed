// src/checker/markdown.rs
// =============================================================================
// This module extracts links from documentation text.
//
// Only inline link syntax is recognised, one line at a time:
// - `[label](https://...)`  -> an inline link that gets checked over the network
// - `![](https://...)`      -> an empty image placeholder (authoring defect)
//
// We deliberately do NOT parse the full Markdown structure. A regex per line
// is enough, and it gives us exact line/column positions for free.
//
// Rust concepts:
// - OnceLock: Compile each regex once and reuse it for every document
// - Iterators: enumerate() gives us line numbers while walking lines()
// - Serialize: Links end up in the JSON report
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// `[label](http(s)://target "optional title")`
// The label must be non-empty, which is what keeps `![](...)` out of this pattern.
const INLINE_LINK_PATTERN: &str = r#"\[([^\]]+)\]\((https?://[^)\s]+)(?:\s+"[^"]*")?\)"#;

// `![](http(s)://target)` - an image with no alt text
const EMPTY_IMAGE_PATTERN: &str = r#"!\[\]\((https?://[^)\s]+)(?:\s+"[^"]*")?\)"#;

fn inline_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INLINE_LINK_PATTERN).unwrap())
}

fn empty_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMPTY_IMAGE_PATTERN).unwrap())
}

/// Which syntax a link was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `[label](url)` - verified over the network
    Inline,
    /// `![](url)` - a placeholder, always a failure
    EmptyImage,
}

/// A link found in a document
///
/// Links are never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// The URL between the parentheses
    pub target: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column (in characters) of the opening bracket
    pub column: usize,
    /// The document the link was found in
    pub document: PathBuf,
    pub kind: LinkKind,
}

// Extracts every http/https link from a document's text
//
// Parameters:
//   document: path of the document (copied into every Link for reporting)
//   text: the full document contents
//
// Returns: Links in document order - line ascending, then left to right.
//
// Example input (line 3):
//   "See [Rust](https://www.rust-lang.org) and ![](https://x.io/a.png)"
//
// Example output:
//   Link { target: "https://www.rust-lang.org", line: 3, column: 5, kind: Inline, .. }
//   Link { target: "https://x.io/a.png",        line: 3, column: 43, kind: EmptyImage, .. }
pub fn extract_links(document: &Path, text: &str) -> Vec<Link> {
    let mut links = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        // Collect both kinds for this line, then sort by position so that the
        // two patterns interleave in reading order
        let mut found: Vec<(usize, String, LinkKind)> = Vec::new();

        for caps in inline_link_regex().captures_iter(line) {
            if let (Some(whole), Some(target)) = (caps.get(0), caps.get(2)) {
                found.push((whole.start(), target.as_str().to_string(), LinkKind::Inline));
            }
        }

        for caps in empty_image_regex().captures_iter(line) {
            if let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) {
                found.push((whole.start(), target.as_str().to_string(), LinkKind::EmptyImage));
            }
        }

        found.sort_by_key(|(start, _, _)| *start);

        for (start, target, kind) in found {
            links.push(Link {
                target,
                line: line_number,
                // Byte offset -> character column, so non-ASCII text lines up in editors
                column: line[..start].chars().count() + 1,
                document: document.to_path_buf(),
                kind,
            });
        }
    }

    links
}
