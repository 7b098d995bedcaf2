//! Path resolution: classify link targets against the file inventory.

use std::path::{Component, Path, PathBuf};

use crate::inventory::FileInventory;
use crate::types::{LinkOccurrence, ResolvedTarget};

/// Scheme prefixes that mark a target as external and never fixable.
const EXTERNAL_PREFIXES: [&str; 5] = ["http://", "https://", "ftp://", "mailto:", "tel:"];

/// Classify one link target.
///
/// External schemes and anchor-only fragments are `External`. Targets that
/// start with `/` resolve from the scanned root; everything else resolves
/// from the source document's directory. A `?query` or `#fragment` suffix
/// is split off before resolution and preserved for fix reconstruction.
/// Targets that escape the root after normalization are `Broken`.
pub fn classify(
    link: &LinkOccurrence,
    inventory: &FileInventory,
    case_insensitive: bool,
) -> ResolvedTarget {
    if is_external(&link.target) {
        return ResolvedTarget::External;
    }

    let (path_part, suffix) = split_suffix(&link.target);
    if path_part.is_empty() {
        // Query-only targets have nothing to resolve on disk.
        return ResolvedTarget::External;
    }

    let candidate = if let Some(from_root) = path_part.strip_prefix('/') {
        lexical_normalize(Path::new(from_root))
    } else {
        let source_dir = link.source.parent().unwrap_or_else(|| Path::new(""));
        lexical_normalize(&source_dir.join(path_part))
    };

    match inventory.lookup(&candidate, case_insensitive) {
        Some(found) => ResolvedTarget::Resolvable {
            path: found.to_path_buf(),
            suffix: suffix.to_string(),
        },
        None => ResolvedTarget::Broken {
            candidate,
            suffix: suffix.to_string(),
        },
    }
}

/// Whether a raw target uses a recognized external scheme or is an
/// anchor-only fragment.
pub fn is_external(target: &str) -> bool {
    target.starts_with('#') || EXTERNAL_PREFIXES.iter().any(|p| target.starts_with(p))
}

/// Split a target at the first `#` or `?`, keeping the delimiter with
/// the suffix so a fix can reattach it verbatim.
pub fn split_suffix(target: &str) -> (&str, &str) {
    match target.find(['#', '?']) {
        Some(index) => target.split_at(index),
        None => (target, ""),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
/// A path that climbs past its first component keeps the leading `..`,
/// which can never match a root-relative inventory entry.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match out.last() {
                Some(Component::ParentDir) | None => out.push(component),
                Some(_) => {
                    out.pop();
                },
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Express a root-relative `target` path relative to a root-relative
/// source directory, with forward slashes, for writing back into a link.
pub fn relative_from(target: &Path, source_dir: &Path) -> String {
    let target_parts: Vec<&std::ffi::OsStr> = target.iter().collect();
    let source_parts: Vec<&std::ffi::OsStr> = source_dir
        .iter()
        .filter(|p| !p.is_empty())
        .collect();

    let shared = target_parts
        .iter()
        .zip(source_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in shared..source_parts.len() {
        parts.push("..".to_string());
    }
    for part in &target_parts[shared..] {
        parts.push(part.to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
