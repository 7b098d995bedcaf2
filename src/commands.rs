//! Core CLI commands for mdmend: check, fix, report.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::analyze::{CancelToken, analyze_tree};
use crate::apply;
use crate::backup;
use crate::config::Config;
use crate::error;
use crate::inventory::FileInventory;
use crate::render;
use crate::report::{AnalysisReport, RunContext};
use crate::types::IssueKind;

/// Everything a command needs after the analysis pipeline has run.
struct Analysis {
    config: Config,
    inventory: FileInventory,
    report: AnalysisReport,
    run: RunContext,
}

/// Analyze links and print findings without changing any file.
///
/// Exit code priority: broken (2) > mismatched (1) > clean (0).
///
/// # Errors
///
/// Returns errors from config loading or inventory construction.
pub fn check(root: &Path, config_path: Option<&Path>) -> Result<ExitCode, error::Error> {
    let analysis = run_analysis(root, config_path)?;
    print_findings(&analysis.report);
    print_summary(&analysis.report);

    let summary = &analysis.report.summary;
    if summary.broken_links > 0 {
        return Ok(ExitCode::from(2));
    }
    if summary.mismatched_text > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Analyze links and apply every auto-fixable fix, backing the tree up
/// first unless told otherwise.
///
/// # Errors
///
/// Returns errors from analysis, backup creation, or fix application.
pub fn fix(
    root: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    no_backup: bool,
) -> Result<ExitCode, error::Error> {
    let analysis = run_analysis(root, config_path)?;
    print_findings(&analysis.report);

    let fixable = analysis.report.auto_fixable_issues().count();
    if fixable == 0 {
        eprintln!("Nothing to fix.");
        return Ok(ExitCode::SUCCESS);
    }

    if !dry_run && !no_backup {
        let (backup_dir, copied) = backup::create_backup(
            &analysis.inventory,
            &analysis.run,
            analysis.config.max_backup_files,
        )?;
        eprintln!("Backed up {copied} files to {}", backup_dir.display());
    }

    let applied = apply::apply_fixes(&analysis.run.root, &analysis.report, dry_run)?;
    if dry_run {
        eprintln!("Would apply {applied} fixes (dry run).");
    } else {
        let touched = apply::touched_files(&analysis.report).len();
        eprintln!("Applied {applied} fixes across {touched} files.");
    }

    return Ok(ExitCode::SUCCESS);
}

/// Analyze links and write the HTML and JSON reports.
///
/// # Errors
///
/// Returns errors from analysis or report writing.
pub fn report(
    root: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<ExitCode, error::Error> {
    let analysis = run_analysis(root, config_path)?;
    print_summary(&analysis.report);

    let out_dir: PathBuf = output.map_or_else(|| analysis.run.root.clone(), Path::to_path_buf);
    let paths = render::write_reports(&analysis.report, &analysis.run, &out_dir)?;
    eprintln!("Wrote {}", paths.html.display());
    eprintln!("Wrote {}", paths.json.display());

    return Ok(ExitCode::SUCCESS);
}

/// Load config, snapshot the inventory, and run the analysis pipeline.
///
/// The snapshot is taken before any document is analyzed; fuzzy results
/// depend on seeing the complete candidate set.
///
/// # Errors
///
/// Returns errors from config loading or inventory construction.
fn run_analysis(root: &Path, config_path: Option<&Path>) -> Result<Analysis, error::Error> {
    let config = match config_path {
        Some(path) => Config::load_file(path)?,
        None => Config::load(root)?,
    };

    let inventory = FileInventory::snapshot(root, &config)?;
    let run = RunContext::new(inventory.root().to_path_buf());
    let report = analyze_tree(&inventory, &config, &run, &CancelToken::new());

    return Ok(Analysis {
        config,
        inventory,
        report,
        run,
    });
}

/// Print one line per finding, grep-friendly.
fn print_findings(report: &AnalysisReport) {
    for analysis in &report.files {
        if let Some(reason) = &analysis.read_error {
            println!("SKIPPED   {}  ({reason})", analysis.path.display());
        }
        for issue in &analysis.issues {
            let location = format!("{}:{}", analysis.path.display(), issue.link.line);
            match issue.kind {
                IssueKind::BrokenLink => {
                    let suggestion = issue
                        .replacement
                        .as_deref()
                        .unwrap_or("(no candidate)");
                    println!("BROKEN    {location}  {} -> {suggestion}", issue.link.target);
                },
                IssueKind::MismatchedText => {
                    let suggestion = issue.replacement.as_deref().unwrap_or("");
                    println!(
                        "MISMATCH  {location}  \"{}\" -> \"{suggestion}\"",
                        issue.link.display
                    );
                },
            }
        }
    }
    return;
}

/// Print the aggregate counters.
fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;
    println!(
        "{} files, {} links, {} broken, {} mismatched, {} unreadable",
        s.total_files, s.total_links, s.broken_links, s.mismatched_text, s.unreadable_files
    );
    return;
}
