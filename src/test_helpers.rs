//! Shared test utilities for the gallery-core test suite.
//!
//! Fixture builders for directory trees, timestamps and real image files.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! create_tree(tmp.path(), &["a.jpg", "sub/", "sub/b.png"]);
//! set_mtime(&tmp.path().join("a.jpg"), 2024, 3, 15);
//!
//! let items = build_folder_view(tmp.path()).unwrap();
//! assert_eq!(sorted_labels(&items), vec!["a.jpg", "sub"]);
//! ```

use chrono::{Local, NaiveDate, TimeZone};
use filetime::FileTime;
use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;

use crate::types::GalleryItem;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create files and directories under `root`.
///
/// Entries ending in `/` are directories; everything else is a file with
/// placeholder content (listing only looks at extensions). Parents are
/// created as needed.
pub fn create_tree(root: &Path, entries: &[&str]) {
    for entry in entries {
        let path = root.join(entry.trim_end_matches('/'));
        if entry.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "fake image").unwrap();
        }
    }
}

/// Set the modification time of `path` to local noon on the given date.
pub fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let secs = Local.from_local_datetime(&naive).earliest().unwrap().timestamp();
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

/// Write a real JPEG with a colour gradient so decoders have work to do.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Item list helpers
// =========================================================================

/// Labels of `items`, sorted. For listings whose order is up to the OS.
pub fn sorted_labels(items: &[GalleryItem]) -> Vec<String> {
    let mut labels: Vec<String> = items.iter().map(GalleryItem::label).collect();
    labels.sort();
    labels
}

/// Build a date-view style list from `(month title, photo count)` groups.
///
/// Photo paths are `/g<group>/<n>.jpg`.
pub fn month_groups(groups: &[(&str, usize)]) -> Vec<GalleryItem> {
    let mut items = Vec::new();
    for (g, (title, count)) in groups.iter().enumerate() {
        items.push(GalleryItem::divider(*title));
        for n in 0..*count {
            items.push(GalleryItem::photo(format!("/g{g}/{n}.jpg")));
        }
    }
    items
}

/// `count` photos without dividers, as in a folder view.
pub fn plain_photos(count: usize) -> Vec<GalleryItem> {
    (0..count)
        .map(|n| GalleryItem::photo(format!("/p/{n}.jpg")))
        .collect()
}
