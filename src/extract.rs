//! Link extraction: ordered patterns over document text, in document order.

use regex::Regex;

use crate::types::{Document, LinkOccurrence};

/// A candidate match before overlap resolution.
struct RawMatch {
    display: String,
    end: usize,
    pattern_index: usize,
    start: usize,
    target: String,
}

/// Extract all links from a document using the configured ordered patterns.
///
/// Patterns are tried in configured order per match position; the first
/// pattern that matches at a position wins, and overlapping matches are
/// dropped so no link is counted twice. Fenced code blocks and inline code
/// spans are skipped. Pure function over the text and pattern list.
pub fn extract_links(doc: &Document, patterns: &[Regex]) -> Vec<LinkOccurrence> {
    let mut links = Vec::new();
    let mut in_code_block = false;

    for (index, line) in doc.text.lines().enumerate() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        let line_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        extract_from_line(doc, line, line_number, patterns, &mut links);
    }

    links
}

/// Collect matches from every pattern on one line, then resolve overlaps.
fn extract_from_line(
    doc: &Document,
    line: &str,
    line_number: u32,
    patterns: &[Regex],
    links: &mut Vec<LinkOccurrence>,
) {
    let mut raw: Vec<RawMatch> = Vec::new();
    for (pattern_index, pattern) in patterns.iter().enumerate() {
        for cap in pattern.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };
            let Some(target) = cap.get(2) else { continue };
            let display = cap.get(1).map_or("", |m| m.as_str());
            raw.push(RawMatch {
                display: display.to_string(),
                end: whole.end(),
                pattern_index,
                start: whole.start(),
                target: target.as_str().to_string(),
            });
        }
    }

    // Earliest start wins; at equal starts, configured pattern order wins.
    raw.sort_by_key(|m| (m.start, m.pattern_index));

    let mut taken_until = 0usize;
    for m in raw {
        if m.start < taken_until {
            continue;
        }
        taken_until = m.end;

        if inside_inline_code(line, m.start) || !is_probable_link(&m.target) {
            continue;
        }

        links.push(LinkOccurrence {
            display: m.display,
            line: line_number,
            source: doc.path.clone(),
            target: m.target,
        });
    }
}

/// A match preceded by an odd number of backticks sits inside an inline
/// code span.
fn inside_inline_code(line: &str, start: usize) -> bool {
    line.get(..start)
        .is_some_and(|prefix| prefix.matches('`').count() % 2 == 1)
}

/// Heuristic filter separating real link targets from code fragments that
/// happen to match the bracket syntax (array indexing, function calls).
fn is_probable_link(target: &str) -> bool {
    const PATH_PREFIXES: [&str; 8] = [
        "http://", "https://", "ftp://", "mailto:", "#", "./", "../", "/",
    ];
    const FILE_EXTENSIONS: [&str; 8] = [
        ".md", ".html", ".pdf", ".txt", ".png", ".jpg", ".gif", ".svg",
    ];

    if PATH_PREFIXES.iter().any(|p| target.starts_with(p)) {
        return true;
    }
    if FILE_EXTENSIONS.iter().any(|e| target.ends_with(e)) {
        return true;
    }
    if target.contains('/') || target.contains('\\') {
        return true;
    }
    // Spaces plus commas or several words look like call parameters.
    if target.contains(' ') && (target.contains(',') || target.split_whitespace().count() > 2) {
        return false;
    }
    true
}
