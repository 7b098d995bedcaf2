/// Core domain types for link extraction, resolution, and classification.
use std::path::PathBuf;

use serde::Serialize;

/// A loaded markdown document. Immutable once constructed; the counters
/// are derived from the text at load time.
#[derive(Debug, Clone)]
pub struct Document {
    /// Number of ATX headings (`# ...`) in the document.
    pub heading_count: u32,
    /// Number of image references (`![...](...)`) in the document.
    pub image_count: u32,
    /// Path of the document, relative to the scanned root.
    pub path: PathBuf,
    /// Raw document text.
    pub text: String,
    /// Whitespace-separated word count.
    pub word_count: u32,
}

impl Document {
    /// Build a document from its text, deriving the counters.
    pub fn new(path: PathBuf, text: String) -> Self {
        let word_count = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
        let heading_count = text
            .lines()
            .filter(|line| is_atx_heading(line))
            .count();
        let heading_count = u32::try_from(heading_count).unwrap_or(u32::MAX);
        let image_count = u32::try_from(text.matches("![").count()).unwrap_or(u32::MAX);

        Self {
            heading_count,
            image_count,
            path,
            text,
            word_count,
        }
    }
}

/// An ATX heading is one or more `#` followed by a space.
fn is_atx_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let after_hashes = trimmed.trim_start_matches('#');
    after_hashes.len() < trimmed.len() && after_hashes.starts_with(' ')
}

/// One parsed link, in document order. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOccurrence {
    /// The display text between the square brackets.
    pub display: String,
    /// One-based line number of the link in the source document.
    pub line: u32,
    /// Path of the document containing the link, relative to the root.
    pub source: PathBuf,
    /// The raw target string between the parentheses.
    pub target: String,
}

/// Classification of a link target against the file inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// The target does not map to any inventory file. Carries the
    /// root-relative path the link intended to reach, for fuzzy matching.
    Broken {
        /// Normalized root-relative path the target would resolve to.
        candidate: PathBuf,
        /// Preserved `?query` / `#fragment` suffix for fix reconstruction.
        suffix: String,
    },
    /// The target uses a recognized external scheme or is an anchor-only
    /// fragment. Never eligible for fixing.
    External,
    /// The target maps to an existing inventory file.
    Resolvable {
        /// The inventory file the target resolves to, relative to the root.
        path: PathBuf,
        /// Preserved `?query` / `#fragment` suffix for fix reconstruction.
        suffix: String,
    },
}

/// A replacement candidate for a broken target, with its combined score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// Candidate file path, relative to the scanned root.
    pub path: PathBuf,
    /// Combined similarity score in [0.0, 1.0].
    pub score: f64,
}

/// The kind of a link finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The link target does not resolve to any file.
    BrokenLink,
    /// The link resolves, but its display text names a different file.
    MismatchedText,
}

/// A typed finding for one link. Consumed by the aggregator (for counts)
/// and by the apply layer (for mutation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Whether policy and configuration permit automatic correction.
    pub auto_fixable: bool,
    /// Best fuzzy candidate, if any cleared the threshold.
    pub candidate: Option<MatchCandidate>,
    /// The kind of finding.
    pub kind: IssueKind,
    /// The link this issue is about.
    pub link: LinkOccurrence,
    /// Proposed fix text: a new target for broken links, a new display
    /// text for mismatches. Absent when no safe fix exists.
    pub replacement: Option<String>,
}
