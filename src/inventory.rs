//! File inventory: the immutable snapshot of candidate files for one run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;

/// All candidate files under the scanned root after include/exclude
/// filtering. Taken once per run, before any document is analyzed, so
/// fuzzy-match results are stable for the run's duration.
pub struct FileInventory {
    /// Case-folded slash-normalized path -> index into `files`.
    /// On fold collisions the first (lexically smallest) path wins.
    by_folded: HashMap<String, usize>,
    /// Sorted root-relative paths of every candidate file.
    files: Vec<PathBuf>,
    /// Absolute path of the scanned root.
    root: PathBuf,
}

impl FileInventory {
    /// Walk the root and materialize the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::RootNotFound` if the root is not an existing
    /// directory. Unreadable subtrees are skipped, not fatal.
    pub fn snapshot(root: &Path, config: &Config) -> Result<Self, Error> {
        if !root.is_dir() {
            return Err(Error::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let relative_str = slash_normalized(relative);
            if config.include.is_match(&relative_str) && !config.exclude.is_match(&relative_str) {
                files.push(relative.to_path_buf());
            }
        }
        files.sort();

        let mut by_folded = HashMap::with_capacity(files.len());
        for (index, path) in files.iter().enumerate() {
            by_folded
                .entry(slash_normalized(path).to_lowercase())
                .or_insert(index);
        }

        Ok(Self {
            by_folded,
            files,
            root: root.to_path_buf(),
        })
    }

    /// All snapshot files, sorted, relative to the root.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Files whose parent directory is exactly `dir` (root-relative).
    pub fn files_in<'a>(&'a self, dir: &'a Path) -> impl Iterator<Item = &'a PathBuf> {
        self.files
            .iter()
            .filter(move |f| f.parent().unwrap_or_else(|| Path::new("")) == dir)
    }

    /// Whether the snapshot holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Look up a root-relative path in the snapshot, returning the
    /// inventory's canonical spelling of it. Case folding applies only
    /// when `case_insensitive` is set.
    pub fn lookup(&self, relative: &Path, case_insensitive: bool) -> Option<&Path> {
        if let Ok(index) = self.files.binary_search_by(|f| f.as_path().cmp(relative)) {
            return self.files.get(index).map(PathBuf::as_path);
        }
        if !case_insensitive {
            return None;
        }
        let folded = slash_normalized(relative).to_lowercase();
        self.by_folded
            .get(&folded)
            .and_then(|&index| self.files.get(index))
            .map(PathBuf::as_path)
    }

    /// Absolute path of the scanned root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Render a relative path with forward slashes for glob matching and
/// case folding, regardless of host separator.
fn slash_normalized(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
