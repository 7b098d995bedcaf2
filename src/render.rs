//! Report rendering: HTML and JSON writers over a finished report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::report::{AnalysisReport, FileAnalysis, RunContext};
use crate::types::IssueKind;

/// Paths of the reports written by one run.
pub struct ReportPaths {
    /// The HTML report.
    pub html: PathBuf,
    /// The JSON report.
    pub json: PathBuf,
}

/// Write the HTML and JSON reports into `out_dir`, named with the run's
/// timestamp slug.
///
/// # Errors
///
/// Returns `Error::Io` on write failure or `Error::Json` if the report
/// cannot be serialized.
pub fn write_reports(
    report: &AnalysisReport,
    ctx: &RunContext,
    out_dir: &Path,
) -> Result<ReportPaths, Error> {
    std::fs::create_dir_all(out_dir)?;
    let slug = ctx.timestamp_slug();

    let html = out_dir.join(format!("md_analysis_report_{slug}.html"));
    std::fs::write(&html, render_html(report))?;

    let json = out_dir.join(format!("md_analysis_report_{slug}.json"));
    std::fs::write(&json, report.to_json()?)?;

    Ok(ReportPaths { html, json })
}

/// Render the report as a self-contained HTML page: summary cards, a
/// per-file table, and a detail block per file with issues.
pub fn render_html(report: &AnalysisReport) -> String {
    let mut out = String::with_capacity(4096);
    let summary = &report.summary;

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>mdmend report</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"header\"><h1>mdmend report</h1>\
         <p>Generated {}</p><p>Root: <code>{}</code></p></div>\n",
        escape(&report.generated_at),
        escape(&report.root.display().to_string()),
    );

    let _ = write!(
        out,
        "<div class=\"summary\">{}{}{}{}{}</div>\n",
        card("Files", summary.total_files, "info"),
        card("Links", summary.total_links, "info"),
        card("Broken links", summary.broken_links, "error"),
        card("Mismatched text", summary.mismatched_text, "warning"),
        card(
            "Total issues",
            summary.total_issues,
            if summary.total_issues > 0 { "error" } else { "success" },
        ),
    );

    out.push_str(
        "<h2>Files</h2>\n<table>\n<tr><th>File</th><th>Links</th><th>Issues</th>\
         <th>Words</th><th>Headings</th><th>Images</th></tr>\n",
    );
    for analysis in &report.files {
        let _ = write!(
            out,
            "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&analysis.path.display().to_string()),
            analysis.total_links,
            analysis.issues.len(),
            analysis.word_count,
            analysis.heading_count,
            analysis.image_count,
        );
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Issues</h2>\n");
    let with_issues: Vec<&FileAnalysis> = report
        .files
        .iter()
        .filter(|f| !f.issues.is_empty() || f.read_error.is_some())
        .collect();
    if with_issues.is_empty() {
        out.push_str("<p class=\"no-issues\">No issues found.</p>\n");
    }
    for analysis in with_issues {
        render_file_issues(&mut out, analysis);
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// One summary card.
fn card(title: &str, value: u32, class: &str) -> String {
    format!("<div class=\"card {class}\"><h3>{title}</h3><div class=\"number\">{value}</div></div>")
}

/// The issue detail block for one file.
fn render_file_issues(out: &mut String, analysis: &FileAnalysis) {
    let _ = write!(
        out,
        "<div class=\"file\"><h3><code>{}</code></h3>\n",
        escape(&analysis.path.display().to_string())
    );

    if let Some(reason) = &analysis.read_error {
        let _ = write!(
            out,
            "<div class=\"issue\"><span class=\"kind\">unreadable</span> {}</div>\n",
            escape(reason)
        );
    }

    for issue in &analysis.issues {
        let (kind, class) = match issue.kind {
            IssueKind::BrokenLink => ("broken link", "issue"),
            IssueKind::MismatchedText => ("mismatched text", "issue warning"),
        };
        let _ = write!(
            out,
            "<div class=\"{class}\"><span class=\"kind\">{kind}</span> \
             line {}: <strong>{}</strong> &rarr; <code>{}</code>",
            issue.link.line,
            escape(&issue.link.display),
            escape(&issue.link.target),
        );
        if let Some(replacement) = &issue.replacement {
            let _ = write!(out, "<br>Suggested fix: <span class=\"fix\">{}</span>", escape(replacement));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

/// Minimal HTML escaping for text interpolated into the page.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inline stylesheet for the report page.
const STYLE: &str = "\
body{font-family:sans-serif;margin:20px;line-height:1.5}\
.header{background:#f4f4f4;padding:16px;border-radius:5px}\
.summary{display:flex;gap:12px;margin:20px 0}\
.card{border:1px solid #ddd;border-radius:5px;padding:12px;text-align:center;flex:1}\
.card .number{font-size:1.8em;font-weight:bold}\
.card.error .number{color:#c0392b}\
.card.warning .number{color:#e67e22}\
.card.success .number{color:#27ae60}\
.card.info .number{color:#2980b9}\
table{border-collapse:collapse;width:100%}\
th,td{padding:8px;border-bottom:1px solid #ddd;text-align:left}\
.file{border:1px solid #ddd;border-radius:5px;margin:12px 0;padding:12px}\
.issue{border-left:4px solid #c0392b;padding:8px;margin:8px 0;background:#fafafa}\
.issue.warning{border-left-color:#e67e22}\
.kind{font-weight:bold;text-transform:uppercase;font-size:.8em}\
.fix{color:#27ae60;font-weight:bold}\
.no-issues{color:#666}";

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::report::Summary;
    use crate::types::{Issue, LinkOccurrence};

    fn sample_report() -> AnalysisReport {
        let ctx = RunContext::new(PathBuf::from("/tmp/docs"));
        let issue = Issue {
            auto_fixable: true,
            candidate: None,
            kind: IssueKind::BrokenLink,
            link: LinkOccurrence {
                display: "a < b".to_string(),
                line: 3,
                source: PathBuf::from("guide.md"),
                target: "missing.md".to_string(),
            },
            replacement: Some("Missing.md".to_string()),
        };
        let analysis = FileAnalysis {
            broken_links: 1,
            heading_count: 1,
            image_count: 0,
            issues: vec![issue],
            mismatched_text: 0,
            path: PathBuf::from("guide.md"),
            read_error: None,
            total_links: 1,
            word_count: 5,
        };
        AnalysisReport::new(&ctx, vec![analysis])
    }

    #[test]
    fn html_contains_summary_and_escaped_issue() {
        let html = render_html(&sample_report());
        assert!(html.contains("Broken links"));
        assert!(html.contains("a &lt; b"));
        assert!(html.contains("Missing.md"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn reports_are_written_with_timestamped_names() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let ctx = RunContext::new(PathBuf::from("/tmp/docs"));
        let paths = write_reports(&report, &ctx, dir.path()).unwrap();
        assert!(paths.html.exists());
        assert!(paths.json.exists());
        let name = paths.json.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("md_analysis_report_"));
        assert!(name.ends_with(".json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(parsed["summary"]["broken_links"], 1);
    }

    #[test]
    fn clean_report_renders_no_issue_blocks() {
        let ctx = RunContext::new(PathBuf::from("/tmp/docs"));
        let report = AnalysisReport::new(&ctx, Vec::new());
        let html = render_html(&report);
        assert!(html.contains("No issues found."));
    }

    #[test]
    fn summary_default_is_all_zero() {
        assert_eq!(Summary::default().total_issues, 0);
    }
}
