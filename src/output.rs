//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every site is shown by its semantic identity (position in its category
//! and title), with the favicon reference and CSS class as indented context
//! lines. Read top to bottom, a refresh prints an inventory of the catalog.
//!
//! # Output Format
//!
//! ## Refresh
//!
//! ```text
//! Search (2 sites)
//!     001 Google
//!         Favicon: img/www.google.com.png (fetched from yandex)
//!         Class: wwwgooglecom
//!     002 Intranet
//!         Favicon: none (no provider had an icon for intra.example.com)
//!         Class: nofavicon
//!
//! Icons: 0 reused, 1 fetched, 1 missing (2 total)
//! ```
//!
//! ## Restore
//!
//! ```text
//! Restored
//!     content/img
//!     data/websites.yml
//! Removed
//!     static/assets/siteimg.css
//! Returned 3 icons to the backup
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::backup::RestoreReport;
use crate::process::{IconOutcome, ProcessEvent};
use crate::reuse::RunStats;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Path relative to `root` for display, falling back to the full path.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Refresh progress
// ============================================================================

/// Favicon context line: where the icon is and how it got there.
fn favicon_line(favicon: Option<&str>, outcome: &IconOutcome) -> String {
    let favicon = favicon.unwrap_or("none");
    match outcome {
        IconOutcome::Reused => format!("Favicon: {favicon} (reused)"),
        IconOutcome::Fetched { provider } => {
            format!("Favicon: {favicon} (fetched from {provider})")
        }
        IconOutcome::Missing(reason) => format!("Favicon: {favicon} ({reason})"),
    }
}

/// Format a single refresh progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::CategoryStarted { name, site_count } => {
            vec![format!("{} ({})", name, plural(*site_count, "site", "sites"))]
        }
        ProcessEvent::SiteProcessed {
            index,
            title,
            favicon,
            class,
            outcome,
        } => vec![
            format!("{}{} {}", indent(1), format_index(*index), title),
            format!("{}{}", indent(2), favicon_line(favicon.as_deref(), outcome)),
            format!("{}Class: {}", indent(2), class),
        ],
    }
}

/// Print a refresh progress event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-run summary.
pub fn format_run_summary(stats: &RunStats) -> Vec<String> {
    vec![String::new(), format!("Icons: {}", stats)]
}

pub fn print_run_summary(stats: &RunStats) {
    for line in format_run_summary(stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Restore
// ============================================================================

/// Format the result of rolling back an interrupted run.
pub fn format_restore_output(report: &RestoreReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.restored.is_empty() {
        lines.push("Restored".to_string());
        for path in &report.restored {
            lines.push(format!("{}{}", indent(1), display_path(path, root)));
        }
    }
    if !report.removed.is_empty() {
        lines.push("Removed".to_string());
        for path in &report.removed {
            lines.push(format!("{}{}", indent(1), display_path(path, root)));
        }
    }
    if report.icons_returned > 0 {
        lines.push(format!(
            "Returned {} to the backup",
            plural(report.icons_returned as usize, "icon", "icons")
        ));
    }

    lines
}

pub fn print_restore_output(report: &RestoreReport, root: &Path) {
    for line in format_restore_output(report, root) {
        println!("{}", line);
    }
}
