use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::error::Error;

/// Validated run configuration. Link patterns and glob sets are compiled
/// once here; nothing downstream ever sees a raw pattern string, so pattern
/// errors surface at load time and never per-document.
#[derive(Debug)]
pub struct Config {
    /// Whether inventory lookup folds case. Explicit, never inferred
    /// from the host OS.
    pub case_insensitive: bool,
    /// Compiled exclude globs, applied after includes.
    pub exclude: GlobSet,
    /// Whether broken-link issues may be auto-fixed.
    pub fix_broken_links: bool,
    /// Whether mismatched-text issues may be auto-fixed.
    pub fix_mismatched_text: bool,
    /// Compiled include globs selecting candidate files.
    pub include: GlobSet,
    /// Ordered, compiled link patterns. Each has at least two capture
    /// groups: display text, then target.
    pub link_patterns: Vec<Regex>,
    /// Upper bound on files copied into a backup directory.
    pub max_backup_files: usize,
    /// Fixed bonus added when a candidate shares the broken target's
    /// leading numeric token.
    pub numeric_prefix_bonus: f64,
    /// Minimum combined score for a fuzzy candidate to be retained.
    pub similarity_threshold: f64,
}

/// Raw TOML structure for `.mdmend.toml`.
#[derive(serde::Deserialize)]
#[serde(default)]
struct MdmendTomlConfig {
    case_insensitive: bool,
    exclude_patterns: Vec<String>,
    fix_broken_links: bool,
    fix_mismatched_text: bool,
    include_patterns: Vec<String>,
    link_patterns: Vec<String>,
    max_backup_files: usize,
    numeric_prefix_bonus: f64,
    similarity_threshold: f64,
}

impl Default for MdmendTomlConfig {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            exclude_patterns: vec![
                "**/.backup_*/**".to_string(),
                "**/.git/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
            ],
            fix_broken_links: true,
            fix_mismatched_text: true,
            include_patterns: vec!["**/*.md".to_string()],
            link_patterns: vec![r"\[([^\]]*)\]\(([^)]+)\)".to_string()],
            max_backup_files: 500,
            numeric_prefix_bonus: 0.4,
            similarity_threshold: 0.6,
        }
    }
}

impl Config {
    /// Load config from `.mdmend.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or a pattern error if any
    /// glob or link pattern does not compile.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".mdmend.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::from_raw(MdmendTomlConfig::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: MdmendTomlConfig = toml::from_str(&content)?;
        Self::from_raw(raw)
    }

    /// Load config from an explicitly named file. Unlike `load`, a missing
    /// file is an error here: the user asked for this exact path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails, `Error::TomlDe` if the TOML is
    /// malformed, or a pattern error if any pattern does not compile.
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let raw: MdmendTomlConfig = toml::from_str(&content)?;
        Self::from_raw(raw)
    }

    /// Compile and validate a raw config.
    fn from_raw(raw: MdmendTomlConfig) -> Result<Self, Error> {
        let include = build_glob_set(&raw.include_patterns)?;
        let exclude = build_glob_set(&raw.exclude_patterns)?;
        let link_patterns = compile_link_patterns(&raw.link_patterns)?;

        Ok(Self {
            case_insensitive: raw.case_insensitive,
            exclude,
            fix_broken_links: raw.fix_broken_links,
            fix_mismatched_text: raw.fix_mismatched_text,
            include,
            link_patterns,
            max_backup_files: raw.max_backup_files,
            numeric_prefix_bonus: raw.numeric_prefix_bonus,
            similarity_threshold: raw.similarity_threshold,
        })
    }
}

/// Compile a list of glob patterns into one matcher set.
///
/// # Errors
///
/// Returns `Error::InvalidGlob` naming the first pattern that fails.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidGlob {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::InvalidGlob {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

/// Compile the ordered link patterns, enforcing the two-capture-group
/// contract (display text, target) up front.
///
/// # Errors
///
/// Returns `Error::InvalidLinkPattern` for a regex that does not compile,
/// or `Error::MissingCaptureGroups` for one with fewer than two groups.
fn compile_link_patterns(patterns: &[String]) -> Result<Vec<Regex>, Error> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidLinkPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        // captures_len counts the implicit whole-match group 0.
        let found = regex.captures_len().saturating_sub(1);
        if found < 2 {
            return Err(Error::MissingCaptureGroups {
                found,
                pattern: pattern.clone(),
            });
        }
        compiled.push(regex);
    }
    Ok(compiled)
}
