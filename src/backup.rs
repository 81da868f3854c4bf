//! The "-old" backup set around a refresh.
//!
//! A refresh regenerates every artifact from scratch, so the previous run's
//! artifacts are renamed out of the way first:
//!
//! | Artifact | Backup name |
//! |---|---|
//! | `content/img/` | `content/img-old/` |
//! | `static/assets/siteimg.css` | `static/assets/siteimg-old.css` |
//! | `static/assets/siteimgsprite.css` | `static/assets/siteimgsprite-old.css` |
//! | `static/assets/sitesprites.png` | `static/assets/sitesprites-old.png` |
//! | `data/websites.yml` | `data/websites-old.yml` |
//!
//! The backed-up icon directory is where [`reuse`](crate::reuse) recovers
//! icons from, and the backed-up catalog is what the run reads.
//!
//! # Lifecycle
//!
//! 1. [`backup`] refuses to start while any "-old" artifact exists, since
//!    that means an earlier run was interrupted. It then renames whatever
//!    artifacts exist (only the catalog is mandatory) and creates a fresh
//!    icon directory.
//! 2. [`finalize`] deletes the "-old" set once the run has written
//!    everything.
//! 3. [`restore`] rolls an interrupted run back: icons go back into the
//!    backup directory, partial outputs are deleted and every "-old"
//!    artifact takes its original name again.

use crate::config::Layout;
pub use crate::config::backup_path;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error(
        "{} exists: a previous run did not finish. Run with --restore to roll it back",
        .0.display()
    )]
    StaleBackup(PathBuf),
    #[error("catalog not found: {}", .0.display())]
    MissingCatalog(PathBuf),
    #[error("no backup to restore")]
    NothingToRestore,
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    IconDir,
    Output,
    Catalog,
}

/// Every artifact in the backup set, icon directory first.
fn artifacts(layout: &Layout) -> [(Kind, PathBuf); 5] {
    [
        (Kind::IconDir, layout.icon_dir()),
        (Kind::Output, layout.inline_css()),
        (Kind::Output, layout.sprite_css()),
        (Kind::Output, layout.sprite_image()),
        (Kind::Catalog, layout.catalog()),
    ]
}

fn rename(from: &Path, to: &Path) -> Result<(), BackupError> {
    fs::rename(from, to).map_err(|source| BackupError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), BackupError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(io_err(path))
}

fn ensure_parent(path: &Path) -> Result<(), BackupError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_err(parent))
        }
        _ => Ok(()),
    }
}

/// Rename the previous run's artifacts to their "-old" names.
///
/// Returns the artifacts that were renamed.
pub fn backup(layout: &Layout) -> Result<Vec<PathBuf>, BackupError> {
    let set = artifacts(layout);

    if let Some(stale) = set
        .iter()
        .map(|(_, path)| backup_path(path))
        .find(|old| old.exists())
    {
        return Err(BackupError::StaleBackup(stale));
    }

    let catalog = layout.catalog();
    if !catalog.is_file() {
        return Err(BackupError::MissingCatalog(catalog));
    }

    let mut renamed = Vec::new();
    for (_, path) in &set {
        if path.exists() {
            rename(path, &backup_path(path))?;
            renamed.push(path.clone());
        }
    }

    let icon_dir = layout.icon_dir();
    fs::create_dir_all(&icon_dir).map_err(io_err(&icon_dir))?;
    for (kind, path) in &set {
        if *kind != Kind::IconDir {
            ensure_parent(path)?;
        }
    }
    Ok(renamed)
}

/// Delete the "-old" set after a successful run.
pub fn finalize(layout: &Layout) -> Result<(), BackupError> {
    for (_, path) in artifacts(layout) {
        let old = backup_path(&path);
        if old.exists() {
            remove(&old)?;
        }
    }
    Ok(())
}

/// What [`restore`] put back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Artifacts renamed back from their "-old" names.
    pub restored: Vec<PathBuf>,
    /// Partial outputs of the interrupted run that were deleted.
    pub removed: Vec<PathBuf>,
    /// Icons moved from the new icon directory back into the backup.
    pub icons_returned: u32,
}

/// Roll back an interrupted run.
pub fn restore(layout: &Layout) -> Result<RestoreReport, BackupError> {
    let set = artifacts(layout);
    if !set.iter().any(|(_, path)| backup_path(path).exists()) {
        return Err(BackupError::NothingToRestore);
    }

    let mut report = RestoreReport::default();
    for (kind, path) in &set {
        let old = backup_path(path);
        if old.exists() {
            if *kind == Kind::IconDir && path.is_dir() {
                report.icons_returned += return_icons(path, &old)?;
            }
            if path.exists() {
                remove(path)?;
            }
            rename(&old, path)?;
            report.restored.push(path.clone());
        } else if *kind != Kind::Catalog && path.exists() {
            // No earlier version: whatever is here came from the interrupted run
            remove(path)?;
            report.removed.push(path.clone());
        }
    }
    Ok(report)
}

/// Move icons the interrupted run took out of `backup_dir` back into it.
///
/// Files that also still exist in the backup are newer downloads and are
/// left to be deleted with the new directory.
fn return_icons(icon_dir: &Path, backup_dir: &Path) -> Result<u32, BackupError> {
    let mut returned = 0;
    for entry in fs::read_dir(icon_dir).map_err(io_err(icon_dir))? {
        let entry = entry.map_err(io_err(icon_dir))?;
        let from = entry.path();
        if !from.is_file() {
            continue;
        }
        let to = backup_dir.join(entry.file_name());
        if !to.exists() {
            rename(&from, &to)?;
            returned += 1;
        }
    }
    Ok(returned)
}
