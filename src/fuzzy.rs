//! Fuzzy matching: rank replacement candidates for a broken link target.
//!
//! Scoring is a pure, total, deterministic function of the two filenames:
//! an LCS-based similarity ratio over case-folded, extension-stripped
//! names, plus a fixed bonus when both share a leading numeric token
//! (the "numbered lesson file" convention, `01_`, `02_`, ...).

use std::cmp::Ordering;
use std::path::PathBuf;

use crate::types::MatchCandidate;

/// Similarity ratio in [0.0, 1.0] between two names, case-folded.
/// 1.0 iff the folded names are identical, 0.0 iff they share no
/// characters. Ratio is `2 * lcs / (len_a + len_b)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let lcs = lcs_length(&a, &b);
    (2.0 * lcs as f64) / ((a.len() + b.len()) as f64)
}

/// Longest common subsequence length, rolling two DP rows.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0_usize; b.len() + 1];
    let mut curr = vec![0_usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }

    prev[b.len()]
}

/// The leading run of ASCII digits in a filename, if any.
pub fn numeric_prefix(name: &str) -> Option<&str> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    if end == 0 { None } else { name.get(..end) }
}

/// Filename without its last extension.
fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(s, _)| s)
}

/// Rank candidate files against a broken target's filename.
///
/// Candidates scoring below `threshold` are discarded entirely; a score
/// exactly at the threshold is retained. The result is ordered by score
/// descending, then shorter path, then lexical path order — deterministic
/// and stable across runs on the same inventory. Returns an empty vector,
/// never an error, when nothing clears the threshold.
pub fn rank<'a, I>(broken_name: &str, candidates: I, threshold: f64, bonus: f64) -> Vec<MatchCandidate>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let broken_stem = stem(broken_name);
    let broken_prefix = numeric_prefix(broken_name);

    let mut ranked: Vec<MatchCandidate> = Vec::new();
    for path in candidates {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let mut score = similarity(broken_stem, stem(name));
        if let (Some(a), Some(b)) = (broken_prefix, numeric_prefix(name))
            && a == b
        {
            score = (score + bonus).min(1.0);
        }
        if score >= threshold {
            ranked.push(MatchCandidate {
                path: path.clone(),
                score,
            });
        }
    }

    ranked.sort_by(candidate_order);
    ranked
}

/// Score descending, then component count, then path length, then lexical.
fn candidate_order(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.path.components().count().cmp(&b.path.components().count()))
        .then_with(|| a.path.as_os_str().len().cmp(&b.path.as_os_str().len()))
        .then_with(|| a.path.cmp(&b.path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn identical_names_score_one() {
        assert!((similarity("setup", "setup") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("Setup", "setup") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disjoint_names_score_zero() {
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
    }

    #[test]
    fn threshold_boundary_retains_exact_matches_only() {
        let candidates = paths(&["setup.md", "xyzzy.md"]);
        let ranked = rank("setup.md", &candidates, 1.0, 0.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path, PathBuf::from("setup.md"));
        assert!((ranked[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn below_threshold_candidates_never_appear() {
        let candidates = paths(&["completely_different.md"]);
        for threshold in [0.3, 0.6, 0.9] {
            let ranked = rank("setup.md", &candidates, threshold, 0.0);
            assert!(ranked.iter().all(|c| c.score >= threshold));
        }
    }

    #[test]
    fn numeric_prefix_bonus_takes_precedence_over_text_similarity() {
        let candidates = paths(&["02_Configuration.md", "Setup_Guide.md"]);

        // Sanity: raw text similarity favors the other candidate.
        let same_prefix = similarity("02_Setup", "02_Configuration");
        let no_prefix = similarity("02_Setup", "Setup_Guide");
        assert!(no_prefix > same_prefix);

        let ranked = rank("02_Setup.md", &candidates, 0.6, 0.4);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path, PathBuf::from("02_Configuration.md"));
    }

    #[test]
    fn ties_break_to_shorter_then_lexical_path() {
        let candidates = paths(&["b/deep/setup.md", "z/setup.md", "a/setup.md"]);
        let ranked = rank("setup.md", &candidates, 0.6, 0.0);
        let order: Vec<&PathBuf> = ranked.iter().map(|c| &c.path).collect();
        assert_eq!(
            order,
            vec![
                &PathBuf::from("a/setup.md"),
                &PathBuf::from("z/setup.md"),
                &PathBuf::from("b/deep/setup.md"),
            ]
        );
    }

    #[test]
    fn numeric_prefix_extraction() {
        assert_eq!(numeric_prefix("02_Setup.md"), Some("02"));
        assert_eq!(numeric_prefix("123.md"), Some("123"));
        assert_eq!(numeric_prefix("Setup.md"), None);
    }
}
