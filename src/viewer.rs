//! Full-size photo viewer navigation.
//!
//! The viewer shows one photo of the gallery list at a time. Arrow buttons
//! step immediately; arrow keys are debounced so holding a key skips ahead
//! once per quiet period instead of decoding every photo it passes.
//!
//! Opening or closing the viewer ends its [`ViewScope`], so a full-size load
//! still in flight for the previous photo is dropped on arrival.

use crate::cache::SizeClass;
use crate::config::ViewerConfig;
use crate::debounce::Debouncer;
use crate::imaging::RasterImage;
use crate::resolve::{ImageResolver, ImageUpdate, ViewScope};
use crate::types::GalleryItem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoWindowState {
    #[default]
    Hidden,
    Shown {
        /// Logical index of the photo in the gallery list.
        index: usize,
        path: PathBuf,
        /// Window title.
        name: String,
    },
}

impl PhotoWindowState {
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Shown { path, .. } => Some(path),
            Self::Hidden => None,
        }
    }
}

#[derive(Debug)]
pub struct PhotoViewer {
    state: PhotoWindowState,
    keys: Debouncer<Direction>,
    scope: ViewScope,
}

impl PhotoViewer {
    pub fn new(key_delay: Duration) -> Self {
        Self {
            state: PhotoWindowState::Hidden,
            keys: Debouncer::new(key_delay),
            scope: ViewScope::new(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.key_repeat_delay())
    }

    pub fn state(&self) -> &PhotoWindowState {
        &self.state
    }

    /// Show the photo at `index`. Returns `false` (and changes nothing) if
    /// `index` is not a photo.
    pub fn open(&mut self, items: &[GalleryItem], index: usize) -> bool {
        match items.get(index) {
            Some(GalleryItem::Photo { path }) => {
                self.show(index, path);
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.state = PhotoWindowState::Hidden;
        self.keys.cancel();
        self.scope.invalidate();
    }

    /// Move to the neighbouring photo, wrapping around the list and skipping
    /// directories and dividers. Returns whether the shown photo changed.
    pub fn step(&mut self, items: &[GalleryItem], direction: Direction) -> bool {
        let PhotoWindowState::Shown { index, .. } = self.state else {
            return false;
        };
        let len = items.len();
        if len == 0 {
            return false;
        }
        let current = index % len;
        for offset in 1..len {
            let candidate = match direction {
                Direction::Next => (current + offset) % len,
                Direction::Previous => (current + len - offset) % len,
            };
            if let GalleryItem::Photo { path } = &items[candidate] {
                self.show(candidate, path);
                return true;
            }
        }
        false
    }

    /// Arrow key pressed. Only the last key in a burst is applied, by
    /// [`PhotoViewer::poll`].
    pub fn key_press(&mut self, direction: Direction, now: Instant) {
        if self.state.is_shown() {
            self.keys.schedule(direction, now);
        }
    }

    /// Apply a debounced key press once it is due.
    pub fn poll(&mut self, items: &[GalleryItem], now: Instant) -> bool {
        match self.keys.poll(now) {
            Some(direction) => self.step(items, direction),
            None => false,
        }
    }

    pub fn key_deadline(&self) -> Option<Instant> {
        self.keys.deadline()
    }

    /// Start loading the shown photo at full size.
    ///
    /// Returns the cached grid thumbnail, if any, to display while the full
    /// image loads.
    pub fn request_image(
        &self,
        resolver: &Arc<ImageResolver>,
        updates: Sender<ImageUpdate>,
    ) -> Option<Arc<RasterImage>> {
        let path = self.state.path()?;
        let placeholder = resolver.cached(path, SizeClass::Preview);
        resolver.request(
            path.to_path_buf(),
            SizeClass::Full,
            self.scope.ticket(),
            updates,
        );
        placeholder
    }

    fn show(&mut self, index: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.scope.invalidate();
        self.state = PhotoWindowState::Shown {
            index,
            path: path.to_path_buf(),
            name,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::imaging::ImageCodec;
    use crate::imaging::codec::tests::MockCodec;
    use crate::test_helpers::month_groups;
    use std::sync::mpsc;

    const KEY_DELAY: Duration = Duration::from_millis(200);

    fn mixed() -> Vec<GalleryItem> {
        vec![
            GalleryItem::directory("/g/sub"),
            GalleryItem::photo("/g/a.jpg"),
            GalleryItem::divider("May 2024"),
            GalleryItem::photo("/g/b.jpg"),
            GalleryItem::photo("/g/c.jpg"),
            GalleryItem::directory("/g/other"),
        ]
    }

    fn shown_index(viewer: &PhotoViewer) -> Option<usize> {
        match viewer.state() {
            PhotoWindowState::Shown { index, .. } => Some(*index),
            PhotoWindowState::Hidden => None,
        }
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    #[test]
    fn open_photo_shows_it() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        assert!(viewer.open(&items, 3));
        assert_eq!(
            viewer.state(),
            &PhotoWindowState::Shown {
                index: 3,
                path: PathBuf::from("/g/b.jpg"),
                name: "b.jpg".to_string(),
            }
        );
    }

    #[test]
    fn open_non_photo_is_rejected() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        assert!(!viewer.open(&items, 0));
        assert!(!viewer.open(&items, 2));
        assert!(!viewer.open(&items, 99));
        assert!(!viewer.state().is_shown());
    }

    #[test]
    fn close_hides_and_drops_pending_key() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        let t0 = Instant::now();
        viewer.open(&items, 1);
        viewer.key_press(Direction::Next, t0);
        viewer.close();

        assert_eq!(viewer.state(), &PhotoWindowState::Hidden);
        assert_eq!(viewer.key_deadline(), None);
        assert!(!viewer.poll(&items, t0 + KEY_DELAY));
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    #[test]
    fn step_skips_non_photos_and_wraps() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        viewer.open(&items, 1);

        let mut visited = Vec::new();
        for _ in 0..4 {
            assert!(viewer.step(&items, Direction::Next));
            visited.push(shown_index(&viewer).unwrap());
        }
        assert_eq!(visited, vec![3, 4, 1, 3]);
    }

    #[test]
    fn step_backwards_wraps() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        viewer.open(&items, 1);
        assert!(viewer.step(&items, Direction::Previous));
        assert_eq!(shown_index(&viewer), Some(4));
    }

    #[test]
    fn single_photo_does_not_move() {
        let items = month_groups(&[("A", 1)]);
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        viewer.open(&items, 1);
        assert!(!viewer.step(&items, Direction::Next));
        assert_eq!(shown_index(&viewer), Some(1));
    }

    #[test]
    fn step_while_hidden_is_noop() {
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        assert!(!viewer.step(&mixed(), Direction::Next));
        assert!(!viewer.state().is_shown());
    }

    // =========================================================================
    // Debounced keys
    // =========================================================================

    #[test]
    fn key_burst_applies_last_key_once() {
        let items = mixed();
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        let t0 = Instant::now();
        viewer.open(&items, 3);

        viewer.key_press(Direction::Next, t0);
        viewer.key_press(Direction::Next, t0 + Duration::from_millis(50));
        viewer.key_press(Direction::Previous, t0 + Duration::from_millis(100));

        assert!(!viewer.poll(&items, t0 + Duration::from_millis(250)));
        assert!(viewer.poll(&items, t0 + Duration::from_millis(300)));
        assert_eq!(shown_index(&viewer), Some(1));
        assert!(!viewer.poll(&items, t0 + Duration::from_millis(900)));
    }

    #[test]
    fn key_while_hidden_is_ignored() {
        let mut viewer = PhotoViewer::new(KEY_DELAY);
        viewer.key_press(Direction::Next, Instant::now());
        assert_eq!(viewer.key_deadline(), None);
    }

    // =========================================================================
    // Image loading
    // =========================================================================

    #[test]
    fn request_image_seeds_with_preview() {
        let codec: Arc<dyn ImageCodec> = Arc::new(MockCodec::with_size(1600, 1200));
        let resolver =
            Arc::new(ImageResolver::new(codec, None, &CacheConfig::default()).unwrap());
        let items = mixed();
        resolver.resolve_preview(Path::new("/g/a.jpg")).unwrap();

        let mut viewer = PhotoViewer::new(KEY_DELAY);
        viewer.open(&items, 1);
        let (tx, rx) = mpsc::channel();
        let placeholder = viewer.request_image(&resolver, tx).unwrap();
        assert_eq!(placeholder.dimensions(), (384, 288));

        let updates: Vec<ImageUpdate> = rx.iter().collect();
        let full = updates.last().unwrap().state.success().unwrap();
        assert_eq!(full.dimensions(), (1600, 1200));
    }

    #[test]
    fn request_image_when_hidden_does_nothing() {
        let codec: Arc<dyn ImageCodec> = Arc::new(MockCodec::new());
        let resolver =
            Arc::new(ImageResolver::new(codec, None, &CacheConfig::default()).unwrap());
        let viewer = PhotoViewer::new(KEY_DELAY);
        let (tx, rx) = mpsc::channel();
        assert!(viewer.request_image(&resolver, tx).is_none());
        assert!(rx.recv().is_err());
    }
}
