//! Fix application: the only place that mutates source documents.
//!
//! Receives issues from a finished report and performs the text
//! substitutions the classifier proposed. Never invoked from within the
//! analysis pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::report::AnalysisReport;
use crate::types::{Issue, IssueKind};

/// Apply every auto-fixable issue in the report to the files under `root`.
/// Returns the number of substitutions performed. With `dry_run` set, the
/// substitutions are counted but nothing is written.
///
/// Fixes are grouped so each file is read and written once; files are
/// processed in path order for reproducible output.
///
/// # Errors
///
/// Returns `Error::Io` if a document cannot be read or written back.
pub fn apply_fixes(root: &Path, report: &AnalysisReport, dry_run: bool) -> Result<u32, Error> {
    let mut by_file: HashMap<&Path, Vec<&Issue>> = HashMap::new();
    for (path, issue) in report.auto_fixable_issues() {
        by_file.entry(path).or_default().push(issue);
    }

    let mut paths: Vec<&Path> = by_file.keys().copied().collect();
    paths.sort_unstable();

    let mut applied = 0_u32;
    for path in paths {
        let Some(issues) = by_file.get(path) else { continue };
        let absolute = root.join(path);
        let content = std::fs::read_to_string(&absolute)?;
        let mut updated = content.clone();

        for issue in issues {
            if let Some((old, new)) = substitution(issue)
                && updated.contains(&old)
            {
                updated = updated.replace(&old, &new);
                applied = applied.saturating_add(1);
            }
        }

        if !dry_run && updated != content {
            std::fs::write(&absolute, updated)?;
        }
    }

    Ok(applied)
}

/// The exact old/new text pair for one issue. Broken links get a new
/// target; mismatches get a new display text.
fn substitution(issue: &Issue) -> Option<(String, String)> {
    let replacement = issue.replacement.as_deref()?;
    let old = format!("[{}]({})", issue.link.display, issue.link.target);
    let new = match issue.kind {
        IssueKind::BrokenLink => format!("[{}]({replacement})", issue.link.display),
        IssueKind::MismatchedText => format!("[{replacement}]({})", issue.link.target),
    };
    Some((old, new))
}

/// Paths of the files the apply step would touch, for logging.
pub fn touched_files(report: &AnalysisReport) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = report
        .auto_fixable_issues()
        .map(|(path, _)| path.to_path_buf())
        .collect();
    paths.sort_unstable();
    paths.dedup();
    paths
}
