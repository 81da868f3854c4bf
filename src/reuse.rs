//! Icon reuse across runs.
//!
//! Fetching favicons is slow and rate-limited by third parties, so a normal
//! run recovers every icon the previous run already downloaded. The previous
//! run's icon directory is renamed to `<icon_dir>-old` by the backup step;
//! this module decides, per site, whether its recorded favicon can be taken
//! from there.
//!
//! # Decision
//!
//! There are two outcomes, [`IconDecision::Reuse`] and
//! [`IconDecision::Refetch`]:
//!
//! - `--force` always refetches.
//! - A recorded favicon whose backed-up file is at least
//!   [`MIN_ICON_BYTES`](crate::fetch::MIN_ICON_BYTES) is reused by *moving*
//!   the file into the new icon directory. The backup copy is gone afterward.
//! - A recorded favicon already present in the new icon directory is reused
//!   in place. This happens when two sites share a host: the first one moved
//!   the file.
//! - Anything else (no recorded favicon, missing or undersized file) is
//!   refetched.
//!
//! Reuse is keyed by filename only; there is no content hashing.

use crate::config::Layout;
use crate::fetch::MIN_ICON_BYTES;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How a site's favicon is resolved this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconDecision {
    /// Keep the recorded favicon. `restore_from` is the backed-up file to
    /// move into place, or `None` when the file is already in place.
    Reuse {
        favicon: String,
        restore_from: Option<PathBuf>,
    },
    /// Discard the recorded favicon and ask the providers.
    Refetch,
}

/// Whether `path` is an icon file worth keeping.
pub fn is_usable_icon(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() >= MIN_ICON_BYTES)
}

/// Decide between reuse and refetch for a site's recorded favicon.
pub fn decide(layout: &Layout, favicon: Option<&str>, force: bool) -> IconDecision {
    if force {
        return IconDecision::Refetch;
    }
    let Some(favicon) = favicon.filter(|f| !f.is_empty()) else {
        return IconDecision::Refetch;
    };

    if let Some(backup) = layout.backed_up_favicon(favicon)
        && is_usable_icon(&backup)
    {
        return IconDecision::Reuse {
            favicon: favicon.to_string(),
            restore_from: Some(backup),
        };
    }

    if favicon.starts_with(&layout.favicon_prefix())
        && is_usable_icon(&layout.resolve_favicon(favicon))
    {
        return IconDecision::Reuse {
            favicon: favicon.to_string(),
            restore_from: None,
        };
    }

    IconDecision::Refetch
}

/// Carry out a reuse decision: move the backed-up file into the new icon
/// directory if needed.
pub fn restore_icon(layout: &Layout, favicon: &str, from: Option<&Path>) -> std::io::Result<()> {
    match from {
        Some(from) => std::fs::rename(from, layout.resolve_favicon(favicon)),
        None => Ok(()),
    }
}

/// Delete files in `icon_dir` too small to be icons.
///
/// Undersized responses are left on disk by the fetcher. Returns the count
/// removed.
pub fn sweep_undersized(icon_dir: &Path) -> std::io::Result<u32> {
    let mut removed = 0;
    for entry in WalkDir::new(icon_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.metadata()?.len() < MIN_ICON_BYTES {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Summary of where a run's icons came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub reused: u32,
    pub fetched: u32,
    pub missing: u32,
    /// Undersized files deleted from the icon directory after the run.
    pub swept: u32,
}

impl RunStats {
    pub fn reuse(&mut self) {
        self.reused += 1;
    }

    pub fn fetch(&mut self) {
        self.fetched += 1;
    }

    pub fn miss(&mut self) {
        self.missing += 1;
    }

    pub fn total(&self) -> u32 {
        self.reused + self.fetched + self.missing
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reused, {} fetched, {} missing ({} total)",
            self.reused,
            self.fetched,
            self.missing,
            self.total()
        )?;
        if self.swept > 0 {
            write!(f, ", {} undersized removed", self.swept)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;
    use crate::test_helpers::write_png;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Layout) {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path(), &PathsConfig::default());
        fs::create_dir_all(layout.icon_dir()).unwrap();
        fs::create_dir_all(layout.backup_icon_dir()).unwrap();
        (tmp, layout)
    }

    // =========================================================================
    // decide
    // =========================================================================

    #[test]
    fn force_always_refetches() {
        let (_tmp, layout) = setup();
        write_png(&layout.backup_icon_dir().join("a.com.png"), 32, 32);

        assert_eq!(
            decide(&layout, Some("img/a.com.png"), true),
            IconDecision::Refetch
        );
    }

    #[test]
    fn usable_backup_is_reused() {
        let (_tmp, layout) = setup();
        let backup = layout.backup_icon_dir().join("a.com.png");
        write_png(&backup, 32, 32);

        assert_eq!(
            decide(&layout, Some("img/a.com.png"), false),
            IconDecision::Reuse {
                favicon: "img/a.com.png".into(),
                restore_from: Some(backup),
            }
        );
    }

    #[test]
    fn undersized_backup_is_refetched() {
        let (_tmp, layout) = setup();
        fs::write(layout.backup_icon_dir().join("a.com.png"), [0u8; 79]).unwrap();

        assert_eq!(
            decide(&layout, Some("img/a.com.png"), false),
            IconDecision::Refetch
        );
    }

    #[test]
    fn icon_already_in_place_is_reused_without_move() {
        let (_tmp, layout) = setup();
        write_png(&layout.icon_dir().join("a.com.png"), 32, 32);

        assert_eq!(
            decide(&layout, Some("img/a.com.png"), false),
            IconDecision::Reuse {
                favicon: "img/a.com.png".into(),
                restore_from: None,
            }
        );
    }

    #[test]
    fn missing_favicon_is_refetched() {
        let (_tmp, layout) = setup();
        assert_eq!(decide(&layout, None, false), IconDecision::Refetch);
        assert_eq!(decide(&layout, Some(""), false), IconDecision::Refetch);
        assert_eq!(
            decide(&layout, Some("img/gone.com.png"), false),
            IconDecision::Refetch
        );
    }

    #[test]
    fn favicon_outside_icon_dir_is_refetched() {
        let (tmp, layout) = setup();
        let elsewhere = tmp.path().join("content/other");
        fs::create_dir_all(&elsewhere).unwrap();
        write_png(&elsewhere.join("a.com.png"), 32, 32);

        assert_eq!(
            decide(&layout, Some("other/a.com.png"), false),
            IconDecision::Refetch
        );
    }

    #[test]
    fn restore_moves_backup() {
        let (_tmp, layout) = setup();
        let backup = layout.backup_icon_dir().join("a.com.png");
        write_png(&backup, 32, 32);

        restore_icon(&layout, "img/a.com.png", Some(&backup)).unwrap();

        assert!(!backup.exists());
        assert!(layout.icon_dir().join("a.com.png").exists());
    }

    #[test]
    fn sweep_removes_only_undersized_files() {
        let (_tmp, layout) = setup();
        let dir = layout.icon_dir();
        fs::write(dir.join("tiny.com.png"), [0u8; 10]).unwrap();
        fs::write(dir.join("edge.com.png"), [0u8; 79]).unwrap();
        fs::write(dir.join("ok.com.png"), [0u8; 80]).unwrap();
        write_png(&dir.join("real.com.png"), 32, 32);

        assert_eq!(sweep_undersized(&dir).unwrap(), 2);

        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["ok.com.png", "real.com.png"]);
    }

    // =========================================================================
    // RunStats
    // =========================================================================

    #[test]
    fn stats_display() {
        let mut s = RunStats::default();
        s.reuse();
        s.reuse();
        s.fetch();
        s.miss();
        assert_eq!(format!("{s}"), "2 reused, 1 fetched, 1 missing (4 total)");
    }

    #[test]
    fn stats_display_with_sweep() {
        let s = RunStats {
            missing: 2,
            swept: 2,
            ..RunStats::default()
        };
        assert_eq!(
            format!("{s}"),
            "0 reused, 0 fetched, 2 missing (2 total), 2 undersized removed"
        );
    }
}
