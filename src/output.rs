//! CLI output formatting for the gallery views.
//!
//! Output is **information-centric, not file-centric**: each line leads with
//! what the user sees in the gallery (a positional index and a label), with
//! filesystem paths as secondary, indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Folder
//!
//! ```text
//! Trips (2 photos, 1 folder)
//! 001 2023/
//! 002 a.jpg
//! 003 c.png
//! ```
//!
//! ## Timeline
//!
//! ```text
//! March 2024 (2 photos)
//!     Item 0, rows 0-1
//!     001 mar15.png
//!         Source: y/z/mar15.png
//!     002 mar1.jpg
//!         Source: mar1.jpg
//! February 2024 (1 photo)
//!     Item 3, rows 2-3
//!     001 feb.jpg
//!         Source: x/feb.jpg
//!
//! 3 photos in 2 months, 4 columns, 4 rows
//! ```
//!
//! ## Warm
//!
//! ```text
//! Failed: broken.jpg
//!     failed to load /photos/broken.jpg: Failed to decode ...
//! Cache: 12 in memory, 30 from disk, 8 decoded (50 total), 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::cache::CacheStats;
use crate::resolve::ImageLoadError;
use crate::types::{GalleryItem, MonthDividerInfo};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

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

/// Path relative to `root` when it lies under it, else as given.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Gallery label of a cell: directories get a trailing slash.
fn item_label(item: &GalleryItem) -> String {
    match item {
        GalleryItem::Directory { .. } => format!("{}/", item.label()),
        _ => item.label(),
    }
}

// ============================================================================
// Folder view
// ============================================================================

/// Format the folder view of `dir`.
pub fn format_folder_view(dir: &Path, items: &[GalleryItem]) -> Vec<String> {
    let photos = items.iter().filter(|i| i.is_photo()).count();
    let folders = items
        .iter()
        .filter(|i| matches!(i, GalleryItem::Directory { .. }))
        .count();
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());

    let mut lines = vec![format!(
        "{} ({}, {})",
        name,
        plural(photos, "photo", "photos"),
        plural(folders, "folder", "folders")
    )];
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), item_label(item)));
    }
    lines
}

pub fn print_folder_view(dir: &Path, items: &[GalleryItem]) {
    for line in format_folder_view(dir, items) {
        println!("{}", line);
    }
}

// ============================================================================
// Timeline (date view)
// ============================================================================

/// Format the date view under `root`, one block per month divider.
pub fn format_timeline(
    root: &Path,
    items: &[GalleryItem],
    dividers: &[MonthDividerInfo],
    columns: usize,
    total_rows: usize,
) -> Vec<String> {
    let mut lines = Vec::new();

    for (k, divider) in dividers.iter().enumerate() {
        lines.push(format!(
            "{} ({})",
            divider.title,
            plural(divider.photo_count, "photo", "photos")
        ));
        lines.push(format!(
            "{}Item {}, rows {}-{}",
            indent(1),
            divider.item_index,
            divider.first_row_index,
            divider.first_row_index + divider.row_span
        ));

        let end = dividers
            .get(k + 1)
            .map(|d| d.item_index)
            .unwrap_or(items.len());
        let group = items.get(divider.item_index + 1..end).unwrap_or_default();
        for (pos, item) in group.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(pos + 1),
                item_label(item)
            ));
            if let Some(path) = item.path() {
                lines.push(format!(
                    "{}Source: {}",
                    indent(2),
                    display_path(path, root)
                ));
            }
        }
    }

    let photos = items.iter().filter(|i| i.is_photo()).count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{} in {}, {}, {}",
        plural(photos, "photo", "photos"),
        plural(dividers.len(), "month", "months"),
        plural(columns, "column", "columns"),
        plural(total_rows, "row", "rows")
    ));
    lines
}

pub fn print_timeline(
    root: &Path,
    items: &[GalleryItem],
    dividers: &[MonthDividerInfo],
    columns: usize,
    total_rows: usize,
) {
    for line in format_timeline(root, items, dividers, columns, total_rows) {
        println!("{}", line);
    }
}

// ============================================================================
// Warm (cache fill)
// ============================================================================

/// Format the outcome of warming the preview cache.
pub fn format_warm_summary(
    root: &Path,
    stats: &CacheStats,
    failures: &[ImageLoadError],
) -> Vec<String> {
    let mut lines = Vec::new();
    for err in failures {
        lines.push(format!("Failed: {}", display_path(&err.path, root)));
        lines.push(format!("{}{}", indent(1), err));
    }
    lines.push(format!("Cache: {}", stats));
    lines
}

pub fn print_warm_summary(root: &Path, stats: &CacheStats, failures: &[ImageLoadError]) {
    for line in format_warm_summary(root, stats, failures) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
