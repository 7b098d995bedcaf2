//! The analysis pipeline: inventory fence, then per-document fan-out.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::classify;
use crate::config::Config;
use crate::extract;
use crate::inventory::FileInventory;
use crate::report::{AnalysisReport, FileAnalysis, RunContext, count_kind};
use crate::types::{Document, IssueKind};

/// Cooperative cancellation at per-document granularity. Cancelled
/// documents are simply not analyzed; the aggregate covers whatever
/// completed before the flag was raised.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Analyze every inventory file and fold the results into a report.
///
/// The inventory snapshot is fully materialized before this is called —
/// that is the one hard ordering barrier in the pipeline. Documents share
/// only the read-only inventory and config, so the fan-out needs no
/// locking; the fold in `AnalysisReport::new` is order-independent.
pub fn analyze_tree(
    inventory: &FileInventory,
    config: &Config,
    ctx: &RunContext,
    cancel: &CancelToken,
) -> AnalysisReport {
    let analyses: Vec<FileAnalysis> = inventory
        .files()
        .par_iter()
        .filter_map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(analyze_one(path, inventory, config))
        })
        .collect();

    AnalysisReport::new(ctx, analyses)
}

/// Load and analyze a single document. Unreadable or non-text files are
/// recorded as a file-level note and skipped, never fatal.
fn analyze_one(path: &Path, inventory: &FileInventory, config: &Config) -> FileAnalysis {
    match std::fs::read_to_string(inventory.root().join(path)) {
        Ok(text) => analyze_document(Document::new(path.to_path_buf(), text), inventory, config),
        Err(e) => FileAnalysis::unreadable(path.to_path_buf(), e.to_string()),
    }
}

/// Extract, resolve, and classify all links in one loaded document.
pub fn analyze_document(
    doc: Document,
    inventory: &FileInventory,
    config: &Config,
) -> FileAnalysis {
    let links = extract::extract_links(&doc, &config.link_patterns);
    let total_links = u32::try_from(links.len()).unwrap_or(u32::MAX);

    let issues: Vec<_> = links
        .iter()
        .filter_map(|link| classify::resolve_and_classify(link, inventory, config))
        .collect();
    let broken_links = count_kind(&issues, IssueKind::BrokenLink);
    let mismatched_text = count_kind(&issues, IssueKind::MismatchedText);

    FileAnalysis {
        broken_links,
        heading_count: doc.heading_count,
        image_count: doc.image_count,
        issues,
        mismatched_text,
        path: doc.path,
        read_error: None,
        total_links,
        word_count: doc.word_count,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture(files: &[(&str, &str)], toml: &str) -> (tempfile::TempDir, FileInventory, Config) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }
        if !toml.is_empty() {
            std::fs::write(dir.path().join(".mdmend.toml"), toml).unwrap();
        }
        let config = Config::load(dir.path()).unwrap();
        let inventory = FileInventory::snapshot(dir.path(), &config).unwrap();
        (dir, inventory, config)
    }

    fn run(inventory: &FileInventory, config: &Config) -> AnalysisReport {
        let ctx = RunContext::new(inventory.root().to_path_buf());
        analyze_tree(inventory, config, &ctx, &CancelToken::new())
    }

    #[test]
    fn case_insensitive_resolution_yields_no_issues() {
        let (_dir, inventory, config) = fixture(
            &[
                ("intro.md", "[See intro](introduction.md)\n"),
                ("Introduction.md", "# Introduction\n"),
            ],
            "case_insensitive = true\n",
        );
        let report = run(&inventory, &config);
        assert_eq!(report.summary.total_issues, 0);
        assert_eq!(report.summary.total_links, 1);
    }

    #[test]
    fn case_sensitive_resolution_flags_broken_with_candidate() {
        let (_dir, inventory, config) = fixture(
            &[
                ("intro.md", "[See intro](introduction.md)\n"),
                ("Introduction.md", "# Introduction\n"),
            ],
            "",
        );
        let report = run(&inventory, &config);
        assert_eq!(report.summary.broken_links, 1);

        let intro = report.files.iter().find(|f| f.path == PathBuf::from("intro.md")).unwrap();
        let issue = &intro.issues[0];
        assert_eq!(issue.kind, IssueKind::BrokenLink);
        let top = issue.candidate.as_ref().unwrap();
        assert_eq!(top.path, PathBuf::from("Introduction.md"));
        assert!(top.score >= 0.6);
    }

    #[test]
    fn external_links_are_never_broken() {
        let (_dir, inventory, config) = fixture(
            &[("a.md", "[site](https://example.com/gone.md) [anchor](#top)\n")],
            "",
        );
        let report = run(&inventory, &config);
        assert_eq!(report.summary.broken_links, 0);
    }

    #[test]
    fn repeated_runs_produce_identical_reports() {
        let (_dir, inventory, config) = fixture(
            &[
                ("a.md", "[one](missing.md) [two](b.md)\n"),
                ("b.md", "# B\n"),
                ("Missing_Page.md", "# M\n"),
            ],
            "",
        );
        let ctx = RunContext::new(inventory.root().to_path_buf());
        let first = analyze_tree(&inventory, &config, &ctx, &CancelToken::new());
        let second = analyze_tree(&inventory, &config, &ctx, &CancelToken::new());
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn cancelled_token_analyzes_nothing() {
        let (_dir, inventory, config) = fixture(&[("a.md", "[x](missing.md)\n")], "");
        let ctx = RunContext::new(inventory.root().to_path_buf());
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = analyze_tree(&inventory, &config, &ctx, &cancel);
        assert!(report.files.is_empty());
    }
}
