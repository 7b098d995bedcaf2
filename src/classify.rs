//! Issue classification and fix policy.
//!
//! A pure classifier over already-computed facts: it combines one link,
//! its resolution, and the fuzzy matcher's ranking into zero or one
//! `Issue`, and decides whether the fix is safe to apply automatically.
//! All file mutation belongs to the apply layer.

use std::path::Path;

use crate::config::Config;
use crate::fuzzy;
use crate::inventory::FileInventory;
use crate::resolve;
use crate::types::{Issue, IssueKind, LinkOccurrence, MatchCandidate, ResolvedTarget};

/// Classify one link against its resolved target.
///
/// Returns `None` for external targets and for resolvable, correctly
/// labeled links.
pub fn classify_link(
    link: &LinkOccurrence,
    resolved: &ResolvedTarget,
    inventory: &FileInventory,
    config: &Config,
) -> Option<Issue> {
    match resolved {
        ResolvedTarget::Broken { candidate, suffix } => {
            Some(broken_link_issue(link, candidate, suffix, inventory, config))
        },
        ResolvedTarget::External => None,
        ResolvedTarget::Resolvable { path, .. } => mismatched_text_issue(link, path, config),
    }
}

/// Build a `BrokenLink` issue, ranking fuzzy candidates for the target.
///
/// Candidates come from the intended directory when it holds inventory
/// files; filename-only scoring across the whole tree would make every
/// identically named file tie. An empty directory falls back to the full
/// inventory.
fn broken_link_issue(
    link: &LinkOccurrence,
    candidate: &Path,
    suffix: &str,
    inventory: &FileInventory,
    config: &Config,
) -> Issue {
    let best = candidate
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|name| {
            let dir = candidate.parent().unwrap_or_else(|| Path::new(""));
            let pool: Vec<&std::path::PathBuf> = inventory.files_in(dir).collect();
            let ranked = if pool.is_empty() {
                fuzzy::rank(
                    name,
                    inventory.files(),
                    config.similarity_threshold,
                    config.numeric_prefix_bonus,
                )
            } else {
                fuzzy::rank(name, pool, config.similarity_threshold, config.numeric_prefix_bonus)
            };
            ranked.into_iter().next()
        });

    let replacement = best.as_ref().map(|top| {
        let source_dir = link.source.parent().unwrap_or_else(|| Path::new(""));
        format!("{}{}", resolve::relative_from(&top.path, source_dir), suffix)
    });

    Issue {
        auto_fixable: config.fix_broken_links && replacement.is_some(),
        candidate: best,
        kind: IssueKind::BrokenLink,
        link: link.clone(),
        replacement,
    }
}

/// Build a `MismatchedText` issue when the display text names a markdown
/// file other than the one the link resolves to.
fn mismatched_text_issue(link: &LinkOccurrence, path: &Path, config: &Config) -> Option<Issue> {
    let expected = display_filename(&link.display)?;
    let actual = path.file_name()?.to_str()?;
    if expected == actual {
        return None;
    }

    let replacement = match link.display.rfind(" in ") {
        Some(index) => {
            let prefix = link.display.get(..index + 4)?;
            format!("{prefix}{actual}")
        },
        None => actual.to_string(),
    };

    Some(Issue {
        auto_fixable: config.fix_mismatched_text,
        candidate: None,
        kind: IssueKind::MismatchedText,
        link: link.clone(),
        replacement: Some(replacement),
    })
}

/// The filename a display text claims to point at, if it claims one.
/// Handles both a bare `Setup.md` and prose like `See details in Setup.md`.
fn display_filename(display: &str) -> Option<&str> {
    if !display.ends_with(".md") {
        return None;
    }
    match display.rfind(" in ") {
        Some(index) => display.get(index + 4..),
        None => Some(display),
    }
}

/// Per-link convenience used by the analyzer: resolve then classify.
pub fn resolve_and_classify(
    link: &LinkOccurrence,
    inventory: &FileInventory,
    config: &Config,
) -> Option<Issue> {
    let resolved = resolve::classify(link, inventory, config.case_insensitive);
    classify_link(link, &resolved, inventory, config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture(files: &[&str], toml: &str) -> (tempfile::TempDir, FileInventory, Config) {
        let dir = tempfile::tempdir().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, "").unwrap();
        }
        if !toml.is_empty() {
            std::fs::write(dir.path().join(".mdmend.toml"), toml).unwrap();
        }
        let config = Config::load(dir.path()).unwrap();
        let inventory = FileInventory::snapshot(dir.path(), &config).unwrap();
        (dir, inventory, config)
    }

    fn occurrence(source: &str, display: &str, target: &str) -> LinkOccurrence {
        LinkOccurrence {
            display: display.to_string(),
            line: 1,
            source: PathBuf::from(source),
            target: target.to_string(),
        }
    }

    #[test]
    fn broken_link_gets_candidate_and_relative_replacement() {
        let (_dir, inventory, config) =
            fixture(&["docs/guide.md", "docs/Introduction.md"], "");
        let link = occurrence("docs/guide.md", "Intro", "introducton.md#setup");
        let issue = resolve_and_classify(&link, &inventory, &config).unwrap();

        assert_eq!(issue.kind, IssueKind::BrokenLink);
        assert!(issue.auto_fixable);
        let top = issue.candidate.unwrap();
        assert_eq!(top.path, PathBuf::from("docs/Introduction.md"));
        assert!(top.score >= 0.6);
        assert_eq!(issue.replacement.as_deref(), Some("Introduction.md#setup"));
    }

    #[test]
    fn broken_link_without_candidate_is_reported_not_fixable() {
        let (_dir, inventory, config) = fixture(&["docs/guide.md", "docs/zzz.md"], "");
        let link = occurrence("docs/guide.md", "x", "qqqq.md");
        let issue = resolve_and_classify(&link, &inventory, &config).unwrap();

        assert_eq!(issue.kind, IssueKind::BrokenLink);
        assert!(!issue.auto_fixable);
        assert!(issue.candidate.is_none());
        assert!(issue.replacement.is_none());
    }

    #[test]
    fn fix_withheld_when_broken_link_fixing_disabled() {
        let (_dir, inventory, config) = fixture(
            &["docs/guide.md", "docs/Introduction.md"],
            "fix_broken_links = false\n",
        );
        let link = occurrence("docs/guide.md", "Intro", "introducton.md");
        let issue = resolve_and_classify(&link, &inventory, &config).unwrap();

        assert_eq!(issue.kind, IssueKind::BrokenLink);
        assert!(!issue.auto_fixable);
        assert!(issue.candidate.is_some(), "issue still reported with candidate");
    }

    #[test]
    fn mismatched_display_text_proposes_actual_filename() {
        let (_dir, inventory, config) = fixture(&["guide.md", "Setup.md"], "");
        let link = occurrence("guide.md", "setup.md", "Setup.md");
        let issue = resolve_and_classify(&link, &inventory, &config).unwrap();

        assert_eq!(issue.kind, IssueKind::MismatchedText);
        assert!(issue.auto_fixable);
        assert_eq!(issue.replacement.as_deref(), Some("Setup.md"));
    }

    #[test]
    fn prose_display_text_keeps_its_prefix() {
        let (_dir, inventory, config) = fixture(&["guide.md", "Setup.md"], "");
        let link = occurrence("guide.md", "See details in setup.md", "Setup.md");
        let issue = resolve_and_classify(&link, &inventory, &config).unwrap();
        assert_eq!(issue.replacement.as_deref(), Some("See details in Setup.md"));
    }

    #[test]
    fn correctly_labeled_resolvable_link_yields_no_issue() {
        let (_dir, inventory, config) = fixture(&["guide.md", "Setup.md"], "");
        for display in ["Setup.md", "the setup guide"] {
            let link = occurrence("guide.md", display, "Setup.md");
            assert!(resolve_and_classify(&link, &inventory, &config).is_none());
        }
    }

    #[test]
    fn external_target_never_produces_broken_link() {
        let (_dir, inventory, config) = fixture(&["guide.md"], "");
        let link = occurrence("guide.md", "site", "https://example.com/missing.md");
        assert!(resolve_and_classify(&link, &inventory, &config).is_none());
    }
}
