//! Backup: copy the scanned files aside before any fix is applied.

use std::path::PathBuf;

use crate::error::Error;
use crate::inventory::FileInventory;
use crate::report::RunContext;

/// Copy every inventory file into a timestamped backup directory under
/// the root, bounded by `max_files`. Returns the backup directory and the
/// number of files copied. Individual files that fail to copy are
/// skipped, matching the run's per-file error policy.
///
/// # Errors
///
/// Returns `Error::Io` if the backup directory itself cannot be created.
pub fn create_backup(
    inventory: &FileInventory,
    ctx: &RunContext,
    max_files: usize,
) -> Result<(PathBuf, usize), Error> {
    let backup_dir = ctx
        .root
        .join(format!(".backup_mdmend_{}", ctx.timestamp_slug()));
    std::fs::create_dir_all(&backup_dir)?;

    let mut copied = 0_usize;
    for relative in inventory.files().iter().take(max_files) {
        let destination = backup_dir.join(relative);
        if let Some(parent) = destination.parent()
            && std::fs::create_dir_all(parent).is_err()
        {
            continue;
        }
        if std::fs::copy(inventory.root().join(relative), &destination).is_ok() {
            copied = copied.saturating_add(1);
        }
    }

    Ok((backup_dir, copied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn backup_copies_inventory_files_up_to_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.md", "b.md", "c.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let config = Config::load(dir.path()).unwrap();
        let inventory = FileInventory::snapshot(dir.path(), &config).unwrap();
        let ctx = RunContext::new(dir.path().to_path_buf());

        let (backup_dir, copied) = create_backup(&inventory, &ctx, 2).unwrap();
        assert_eq!(copied, 2);
        assert!(backup_dir.join("a.md").exists());
        assert!(backup_dir.join("b.md").exists());
        assert!(!backup_dir.join("c.md").exists());
    }

    #[test]
    fn backup_directory_is_excluded_from_later_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "x").unwrap();
        let config = Config::load(dir.path()).unwrap();
        let inventory = FileInventory::snapshot(dir.path(), &config).unwrap();
        let ctx = RunContext::new(dir.path().to_path_buf());
        create_backup(&inventory, &ctx, 500).unwrap();

        let again = FileInventory::snapshot(dir.path(), &config).unwrap();
        assert_eq!(again.len(), 1, "backup copies must not join the inventory");
    }
}
