//! Directory listing for the two gallery views.
//!
//! ## Folder view
//!
//! Immediate children of one directory, in the order the OS lists them.
//! Subdirectories and image files share one list; everything else is
//! dropped.
//!
//! ```text
//! trips/
//! ├── a.jpg        → Photo
//! ├── 2023/        → Directory
//! ├── notes.txt    (skipped)
//! └── c.PNG        → Photo
//! ```
//!
//! ## Date view
//!
//! Every image under the root (recursively; directories are traversed, not
//! listed), newest first by filesystem timestamp, with a month divider in
//! front of each `(year, month)` group:
//!
//! ```text
//! MonthDivider("March 2024")
//! Photo(2024-03-15)
//! Photo(2024-03-01)
//! MonthDivider("February 2024")
//! Photo(2024-02-20)
//! ```
//!
//! Timestamps come from filesystem metadata, never EXIF: reading EXIF for
//! every file of a large library is far too slow for an interactive view.

use crate::config::TimestampSource;
use crate::types::{GalleryItem, GalleryViewType};
use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

/// File extensions shown by the gallery, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "ico", "gif"];

/// The directory backing a view could not be read.
#[derive(Error, Debug)]
#[error("could not read files in {}: {source}", path.display())]
pub struct ListingError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl ListingError {
    fn new(path: &Path, source: impl Into<io::Error>) -> Self {
        Self {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
}

/// List the items for `view_type`.
///
/// `current_dir` is the folder being browsed in the folder view; `root` is
/// the library root the date view walks.
pub fn load_view(
    view_type: GalleryViewType,
    current_dir: &Path,
    root: &Path,
    timestamp: TimestampSource,
) -> Result<Vec<GalleryItem>, ListingError> {
    let items = match view_type {
        GalleryViewType::Folders => build_folder_view(current_dir)?,
        GalleryViewType::All => build_date_view(root, timestamp)?,
    };
    tracing::info!(
        ?view_type,
        dir = %current_dir.display(),
        items = items.len(),
        "view loaded"
    );
    Ok(items)
}

/// Immediate children of `dir`: subdirectories and images, in listing order.
pub fn build_folder_view(dir: &Path) -> Result<Vec<GalleryItem>, ListingError> {
    let entries = fs::read_dir(dir).map_err(|e| ListingError::new(dir, e))?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ListingError::new(dir, e))?;
        let path = entry.path();
        // Follow symlinks so a linked folder browses like a real one.
        if path.is_dir() {
            items.push(GalleryItem::directory(path));
        } else if is_image(&path) {
            items.push(GalleryItem::photo(path));
        }
    }
    Ok(items)
}

/// Every image under `root`, newest first, grouped by month.
///
/// Only an unreadable `root` is an error. Unreadable subdirectories and
/// files without a usable timestamp are skipped with a warning.
pub fn build_date_view(
    root: &Path,
    timestamp: TimestampSource,
) -> Result<Vec<GalleryItem>, ListingError> {
    let mut dated = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(ListingError::new(root, err)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        match file_timestamp(entry.path(), timestamp) {
            Ok(time) => dated.push((entry.into_path(), time)),
            Err(err) => {
                tracing::warn!(
                    path = %entry.path().display(),
                    error = %err,
                    "skipping file without timestamp"
                );
            }
        }
    }

    // Stable: equal timestamps keep walk (file name) order.
    dated.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(group_by_month(dated))
}

/// Local wall-clock time of `path` for the date view.
pub fn file_timestamp(path: &Path, source: TimestampSource) -> io::Result<NaiveDateTime> {
    let meta = fs::metadata(path)?;
    let time: SystemTime = match source {
        TimestampSource::Created => meta.created().or_else(|_| meta.modified())?,
        TimestampSource::Modified => meta.modified()?,
    };
    Ok(DateTime::<Local>::from(time).naive_local())
}

/// "March 2024"
pub fn month_title(time: &NaiveDateTime) -> String {
    time.format("%B %Y").to_string()
}

/// Insert a month divider before every photo whose `(year, month)` differs
/// from the previous photo's. Expects `photos` already sorted.
pub fn group_by_month(photos: Vec<(PathBuf, NaiveDateTime)>) -> Vec<GalleryItem> {
    let mut items = Vec::with_capacity(photos.len() + photos.len() / 8 + 1);
    let mut current: Option<(i32, u32)> = None;
    for (path, time) in photos {
        let month = (time.year(), time.month());
        if current != Some(month) {
            items.push(GalleryItem::divider(month_title(&time)));
            current = Some(month);
        }
        items.push(GalleryItem::photo(path));
    }
    items
}
