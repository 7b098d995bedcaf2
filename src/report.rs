//! Report model: per-file analyses folded into one deterministic aggregate.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;
use crate::types::{Issue, IssueKind};

/// Explicit run context threaded through every component that needs the
/// root or the start time. No process-wide mutable state.
pub struct RunContext {
    /// Absolute path of the scanned root.
    pub root: PathBuf,
    /// Wall-clock start of the run; the single timestamp used for report
    /// and backup filenames.
    pub started_at: chrono::DateTime<chrono::Local>,
}

impl RunContext {
    /// Capture the context at run start.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            started_at: chrono::Local::now(),
        }
    }

    /// Filesystem-safe timestamp slug for generated filenames.
    pub fn timestamp_slug(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}

/// Analysis results for a single document.
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    /// Number of `BrokenLink` issues.
    pub broken_links: u32,
    /// ATX heading count.
    pub heading_count: u32,
    /// Image reference count.
    pub image_count: u32,
    /// All issues found in this document, in document order.
    pub issues: Vec<Issue>,
    /// Number of `MismatchedText` issues.
    pub mismatched_text: u32,
    /// Document path, relative to the scanned root.
    pub path: PathBuf,
    /// File-level note when the document could not be read. The document
    /// is skipped, never fatal.
    pub read_error: Option<String>,
    /// Total links extracted.
    pub total_links: u32,
    /// Whitespace-separated word count.
    pub word_count: u32,
}

impl FileAnalysis {
    /// A placeholder analysis for a document that could not be read.
    pub fn unreadable(path: PathBuf, reason: String) -> Self {
        Self {
            broken_links: 0,
            heading_count: 0,
            image_count: 0,
            issues: Vec::new(),
            mismatched_text: 0,
            path,
            read_error: Some(reason),
            total_links: 0,
            word_count: 0,
        }
    }
}

/// Project-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Total `BrokenLink` issues across all documents.
    pub broken_links: u32,
    /// Total `MismatchedText` issues across all documents.
    pub mismatched_text: u32,
    /// Documents analyzed (including unreadable ones).
    pub total_files: u32,
    /// Total issues of any kind.
    pub total_issues: u32,
    /// Total links extracted.
    pub total_links: u32,
    /// Documents skipped because they could not be read.
    pub unreadable_files: u32,
}

/// The sole externally visible artifact of the analysis core. Immutable
/// once produced; the render and apply layers only read it.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Per-document analyses, sorted by path.
    pub files: Vec<FileAnalysis>,
    /// Run start time, formatted; injected via `RunContext` so two runs
    /// over the same inputs differ only here.
    pub generated_at: String,
    /// Absolute path of the scanned root.
    pub root: PathBuf,
    /// Folded project-wide counters.
    pub summary: Summary,
}

impl AnalysisReport {
    /// Fold per-file analyses into the aggregate. Sorting by path makes
    /// the result independent of the order documents were analyzed in,
    /// so parallel analysis is safe.
    pub fn new(ctx: &RunContext, mut files: Vec<FileAnalysis>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut summary = Summary::default();
        for analysis in &files {
            summary.total_files = summary.total_files.saturating_add(1);
            summary.total_links = summary.total_links.saturating_add(analysis.total_links);
            summary.broken_links = summary.broken_links.saturating_add(analysis.broken_links);
            summary.mismatched_text =
                summary.mismatched_text.saturating_add(analysis.mismatched_text);
            let issue_count = u32::try_from(analysis.issues.len()).unwrap_or(u32::MAX);
            summary.total_issues = summary.total_issues.saturating_add(issue_count);
            summary.unreadable_files = summary
                .unreadable_files
                .saturating_add(u32::from(analysis.read_error.is_some()));
        }

        Self {
            files,
            generated_at: ctx.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            root: ctx.root.clone(),
            summary,
        }
    }

    /// Issues that policy allows the apply layer to act on.
    pub fn auto_fixable_issues(&self) -> impl Iterator<Item = (&Path, &Issue)> {
        self.files.iter().flat_map(|analysis| {
            analysis
                .issues
                .iter()
                .filter(|issue| issue.auto_fixable && issue.replacement.is_some())
                .map(move |issue| (analysis.path.as_path(), issue))
        })
    }

    /// Serialize the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Count issues of one kind in a slice of issues.
pub fn count_kind(issues: &[Issue], kind: IssueKind) -> u32 {
    let count = issues.iter().filter(|i| i.kind == kind).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
