//! Shared types passed between the index, the caches and the presentation
//! layer.
//!
//! Item lists and divider tables are immutable once built: every directory
//! or view-mode change produces a fresh `Vec<GalleryItem>` and a fresh
//! divider table instead of patching the old ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One entry of the flat gallery list.
///
/// The grid renders photos and directories as single cells; a
/// [`MonthDivider`](GalleryItem::MonthDivider) occupies a whole row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryItem {
    Photo { path: PathBuf },
    Directory { path: PathBuf },
    MonthDivider { title: String },
}

impl GalleryItem {
    pub fn photo(path: impl Into<PathBuf>) -> Self {
        Self::Photo { path: path.into() }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory { path: path.into() }
    }

    pub fn divider(title: impl Into<String>) -> Self {
        Self::MonthDivider {
            title: title.into(),
        }
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo { .. })
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, Self::MonthDivider { .. })
    }

    /// Filesystem path for photos and directories, `None` for dividers.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Photo { path } | Self::Directory { path } => Some(path),
            Self::MonthDivider { .. } => None,
        }
    }

    /// Text shown for the item: file name for photos and directories,
    /// the month label for dividers.
    pub fn label(&self) -> String {
        match self {
            Self::Photo { path } | Self::Directory { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::MonthDivider { title } => title.clone(),
        }
    }
}

/// Position and extent of one month group in the rendered grid.
///
/// - `item_index`: logical index of the divider in the flat item list
/// - `photo_count`: photos between this divider and the next one (or the end)
/// - `row_span`: rows those photos occupy at the current column count
/// - `first_row_index`: visual row of the divider itself; the next divider
///   starts at `first_row_index + 1 + row_span`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDividerInfo {
    pub title: String,
    pub item_index: usize,
    pub photo_count: usize,
    pub row_span: usize,
    pub first_row_index: usize,
}

/// How the gallery lists its content.
///
/// Serialized in `SCREAMING_SNAKE_CASE` so `settings.json` reads
/// `"FOLDERS"` / `"ALL"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GalleryViewType {
    /// Immediate children of the current directory.
    #[default]
    Folders,
    /// Every photo under the root, newest first, grouped by month.
    All,
}

impl GalleryViewType {
    /// The view the toggle button switches to.
    pub fn next(self) -> Self {
        match self {
            Self::Folders => Self::All,
            Self::All => Self::Folders,
        }
    }
}

/// Progress of an asynchronous load as observed by the presentation layer.
#[derive(Debug, Clone)]
pub enum LoadState<T, E> {
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> LoadState<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for LoadState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_file_name() {
        assert_eq!(GalleryItem::photo("/a/b/c.jpg").label(), "c.jpg");
        assert_eq!(GalleryItem::directory("/a/b").label(), "b");
        assert_eq!(GalleryItem::divider("March 2024").label(), "March 2024");
    }

    #[test]
    fn divider_has_no_path() {
        assert_eq!(GalleryItem::divider("x").path(), None);
        assert_eq!(
            GalleryItem::photo("/p.jpg").path(),
            Some(Path::new("/p.jpg"))
        );
    }

    #[test]
    fn view_type_cycles() {
        assert_eq!(GalleryViewType::Folders.next(), GalleryViewType::All);
        assert_eq!(GalleryViewType::All.next(), GalleryViewType::Folders);
    }

    #[test]
    fn view_type_serializes_like_settings_file() {
        assert_eq!(
            serde_json::to_string(&GalleryViewType::All).unwrap(),
            "\"ALL\""
        );
        let parsed: GalleryViewType = serde_json::from_str("\"FOLDERS\"").unwrap();
        assert_eq!(parsed, GalleryViewType::Folders);
    }

    #[test]
    fn load_state_from_result() {
        let ok: LoadState<u32, String> = Ok(3).into();
        assert_eq!(ok.success(), Some(&3));
        let err: LoadState<u32, String> = Err("boom".to_string()).into();
        assert_eq!(err.error().map(String::as_str), Some("boom"));
        assert!(LoadState::<u32, String>::Loading.is_loading());
    }
}
