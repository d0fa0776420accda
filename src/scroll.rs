//! Row/item index mapping and the month scrollbar.
//!
//! Three coordinate spaces meet here:
//!
//! - **pixel offset** of the scrollbar handle along its track
//! - **visual row** of the grid, where a divider fills a row by itself
//! - **logical item index** in the flat [`GalleryItem`](crate::types::GalleryItem) list
//!
//! [`ScrollIndexMapper`] converts between rows and items using the divider
//! table; [`ScrollBar`] turns pointer drags into debounced scroll commits.
//!
//! ## Round trip
//!
//! For every row that starts a visual row (each divider's
//! `first_row_index`, and `first_row_index + 1 + k` for `k < row_span`):
//!
//! ```text
//! item_to_row(row_to_item(row)) == row
//! ```

use crate::config::GridConfig;
use crate::debounce::Debouncer;
use crate::types::MonthDividerInfo;
use std::time::{Duration, Instant};

/// Row/item conversion for one divider table and column count.
#[derive(Debug, Clone, Copy)]
pub struct ScrollIndexMapper<'a> {
    dividers: &'a [MonthDividerInfo],
    columns: usize,
    item_count: usize,
}

impl<'a> ScrollIndexMapper<'a> {
    /// `dividers` must be sorted by `item_index` (and therefore by
    /// `first_row_index`), as built by
    /// [`compute_month_dividers`](crate::index::compute_month_dividers).
    pub fn new(dividers: &'a [MonthDividerInfo], columns: usize, item_count: usize) -> Self {
        Self {
            dividers,
            columns: columns.max(1),
            item_count,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Last divider starting at or before `row`.
    fn divider_at_row(&self, row: usize) -> Option<&'a MonthDividerInfo> {
        let idx = self.dividers.partition_point(|d| d.first_row_index <= row);
        idx.checked_sub(1).map(|i| &self.dividers[i])
    }

    /// Last divider at or before `item`.
    fn divider_for_item(&self, item: usize) -> Option<&'a MonthDividerInfo> {
        let idx = self.dividers.partition_point(|d| d.item_index <= item);
        idx.checked_sub(1).map(|i| &self.dividers[i])
    }

    /// First item rendered in `row`.
    ///
    /// Rows past the end map past the end of the list; callers clamp.
    pub fn row_to_item(&self, row: usize) -> usize {
        match self.divider_at_row(row) {
            None => row * self.columns,
            Some(d) if row == d.first_row_index => d.item_index,
            Some(d) => d.item_index + 1 + (row - d.first_row_index - 1) * self.columns,
        }
    }

    /// Row that renders `item`.
    pub fn item_to_row(&self, item: usize) -> usize {
        match self.divider_for_item(item) {
            None => item / self.columns,
            Some(d) if item == d.item_index => d.first_row_index,
            Some(d) => d.first_row_index + 1 + (item - d.item_index - 1) / self.columns,
        }
    }

    /// Total number of visual rows.
    pub fn total_rows(&self) -> usize {
        match self.dividers.last() {
            Some(last) => last.first_row_index + 1 + last.row_span,
            None => self.item_count.div_ceil(self.columns),
        }
    }

    /// Month label shown in `row`'s group, if the row is under a divider.
    pub fn month_for_row(&self, row: usize) -> Option<&'a str> {
        self.divider_at_row(row).map(|d| d.title.as_str())
    }

    /// Month under a pixel offset, with `row_height` pixels per row.
    ///
    /// Negative offsets count as row 0; a non-positive `row_height` has no
    /// month.
    pub fn month_for_offset(&self, offset: f32, row_height: f32) -> Option<&'a str> {
        if !(row_height > 0.0) {
            return None;
        }
        let row = (offset / row_height).round().max(0.0) as usize;
        self.month_for_row(row)
    }
}

/// Interaction state of the scrollbar handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Handle held; the month overlay is visible.
    Dragging { hovered_month: Option<String> },
}

/// A scroll position the list should jump to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommit {
    pub row: usize,
    pub item: usize,
}

/// Scrollbar handle over the grid rows.
///
/// The handle travels `track - handle` pixels; that travel is divided evenly
/// between the grid rows. While dragging, each move updates the hovered
/// month at once and (re)schedules a commit of the row under the handle.
/// The commit is released after a quiet period by [`ScrollBar::poll`], or
/// immediately on [`ScrollBar::pointer_up`]. [`ScrollBar::cancel`] drops it.
#[derive(Debug, Clone)]
pub struct ScrollBar {
    track: f32,
    handle: f32,
    offset: f32,
    state: DragState,
    commit: Debouncer<usize>,
}

impl ScrollBar {
    pub fn new(track: f32, handle: f32, commit_delay: Duration) -> Self {
        Self {
            track: track.max(0.0),
            handle: handle.max(0.0),
            offset: 0.0,
            state: DragState::Idle,
            commit: Debouncer::new(commit_delay),
        }
    }

    pub fn from_config(track: f32, config: &GridConfig) -> Self {
        Self::new(track, config.scrollbar_handle, config.scroll_commit_delay())
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn overlay_visible(&self) -> bool {
        self.is_dragging()
    }

    pub fn hovered_month(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { hovered_month } => hovered_month.as_deref(),
            DragState::Idle => None,
        }
    }

    /// When a pending commit becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.commit.deadline()
    }

    /// Track length changed (window resized).
    pub fn set_track(&mut self, track: f32) {
        self.track = track.max(0.0);
        self.offset = self.offset.clamp(0.0, self.travel());
    }

    fn travel(&self) -> f32 {
        (self.track - self.handle).max(0.0)
    }

    /// Pixels of handle travel per grid row.
    pub fn row_height(&self, mapper: &ScrollIndexMapper<'_>) -> f32 {
        match mapper.total_rows() {
            0 => 0.0,
            rows => self.travel() / rows as f32,
        }
    }

    fn row_at_offset(&self, mapper: &ScrollIndexMapper<'_>) -> Option<usize> {
        let rows = mapper.total_rows();
        if rows == 0 {
            return None;
        }
        let row_height = self.row_height(mapper);
        if !(row_height > 0.0) {
            return Some(0);
        }
        let row = (self.offset / row_height).round().max(0.0) as usize;
        Some(row.min(rows - 1))
    }

    fn hovered(&self, mapper: &ScrollIndexMapper<'_>) -> Option<String> {
        mapper
            .month_for_offset(self.offset, self.row_height(mapper))
            .map(str::to_string)
    }

    pub fn pointer_down(&mut self, mapper: &ScrollIndexMapper<'_>) {
        self.state = DragState::Dragging {
            hovered_month: self.hovered(mapper),
        };
    }

    /// Handle moved by `dy` pixels. Ignored unless dragging.
    pub fn pointer_move(&mut self, dy: f32, mapper: &ScrollIndexMapper<'_>, now: Instant) {
        if !self.is_dragging() {
            return;
        }
        self.offset = (self.offset + dy).clamp(0.0, self.travel());
        self.state = DragState::Dragging {
            hovered_month: self.hovered(mapper),
        };
        if let Some(row) = self.row_at_offset(mapper) {
            self.commit.schedule(row, now);
        }
    }

    /// Release the pending commit once the quiet period has passed.
    pub fn poll(&mut self, now: Instant, mapper: &ScrollIndexMapper<'_>) -> Option<ScrollCommit> {
        self.commit.poll(now).map(|row| Self::to_commit(row, mapper))
    }

    /// End the drag, committing any pending position right away.
    pub fn pointer_up(&mut self, mapper: &ScrollIndexMapper<'_>) -> Option<ScrollCommit> {
        self.state = DragState::Idle;
        self.commit.flush().map(|row| Self::to_commit(row, mapper))
    }

    /// Abort the drag. A pending commit is discarded.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        if self.commit.cancel() {
            tracing::debug!("scroll commit discarded");
        }
    }

    /// Follow the list when it scrolls by other means. Ignored mid-drag.
    pub fn sync_to_row(&mut self, row: usize, mapper: &ScrollIndexMapper<'_>) {
        if self.is_dragging() {
            return;
        }
        self.offset = (row as f32 * self.row_height(mapper)).clamp(0.0, self.travel());
    }

    fn to_commit(row: usize, mapper: &ScrollIndexMapper<'_>) -> ScrollCommit {
        let item = mapper
            .row_to_item(row)
            .min(mapper.item_count().saturating_sub(1));
        ScrollCommit { row, item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::compute_month_dividers;
    use crate::test_helpers::{month_groups, plain_photos};

    const COMMIT: Duration = Duration::from_millis(100);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // =========================================================================
    // Mapper without dividers
    // =========================================================================

    #[test]
    fn plain_list_is_row_major() {
        let mapper = ScrollIndexMapper::new(&[], 4, 10);
        for r in 0..5 {
            assert_eq!(mapper.row_to_item(r), r * 4);
        }
        for i in 0..10 {
            assert_eq!(mapper.item_to_row(i), i / 4);
        }
        assert_eq!(mapper.total_rows(), 3);
        assert_eq!(mapper.month_for_offset(50.0, 10.0), None);
    }

    // =========================================================================
    // Mapper with dividers
    // =========================================================================

    #[test]
    fn row_to_item_with_dividers() {
        let items = month_groups(&[("A", 10), ("B", 3)]);
        let dividers = compute_month_dividers(&items, 4);
        let mapper = ScrollIndexMapper::new(&dividers, 4, items.len());

        let rows: Vec<usize> = (0..6).map(|r| mapper.row_to_item(r)).collect();
        assert_eq!(rows, vec![0, 1, 5, 9, 11, 12]);
    }

    #[test]
    fn item_to_row_with_dividers() {
        let items = month_groups(&[("A", 10), ("B", 3)]);
        let dividers = compute_month_dividers(&items, 4);
        let mapper = ScrollIndexMapper::new(&dividers, 4, items.len());

        assert_eq!(mapper.item_to_row(0), 0);
        assert_eq!(mapper.item_to_row(4), 1);
        assert_eq!(mapper.item_to_row(5), 2);
        assert_eq!(mapper.item_to_row(10), 3);
        assert_eq!(mapper.item_to_row(11), 4);
        assert_eq!(mapper.item_to_row(12), 5);
        assert_eq!(mapper.item_to_row(14), 5);
        assert_eq!(mapper.total_rows(), 6);
    }

    #[test]
    fn round_trip_at_every_row_start() {
        let layouts = [
            month_groups(&[("A", 10), ("B", 3), ("C", 0), ("D", 8)]),
            month_groups(&[("A", 1)]),
            month_groups(&[("A", 4), ("B", 4), ("C", 4)]),
        ];
        for items in &layouts {
            for columns in 1..8 {
                let dividers = compute_month_dividers(items, columns);
                let mapper = ScrollIndexMapper::new(&dividers, columns, items.len());
                for d in &dividers {
                    let mut rows = vec![d.first_row_index];
                    rows.extend((0..d.row_span).map(|k| d.first_row_index + 1 + k));
                    for row in rows {
                        assert_eq!(
                            mapper.item_to_row(mapper.row_to_item(row)),
                            row,
                            "columns {columns} row {row}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn month_for_offset_picks_enclosing_month() {
        let items = month_groups(&[("A", 10), ("B", 3)]);
        let dividers = compute_month_dividers(&items, 4);
        let mapper = ScrollIndexMapper::new(&dividers, 4, items.len());

        assert_eq!(mapper.month_for_offset(0.0, 10.0), Some("A"));
        assert_eq!(mapper.month_for_offset(34.0, 10.0), Some("A"));
        assert_eq!(mapper.month_for_offset(38.0, 10.0), Some("B"));
        assert_eq!(mapper.month_for_offset(1e6, 10.0), Some("B"));
        assert_eq!(mapper.month_for_offset(-25.0, 10.0), Some("A"));
        assert_eq!(mapper.month_for_offset(10.0, 0.0), None);
    }

    // =========================================================================
    // ScrollBar drag state machine
    // =========================================================================

    /// Travel of 100px over the 6 rows of months A(10) and B(3) at 4 columns.
    fn fixture() -> (Vec<MonthDividerInfo>, usize) {
        let items = month_groups(&[("A", 10), ("B", 3)]);
        (compute_month_dividers(&items, 4), items.len())
    }

    fn bar() -> ScrollBar {
        ScrollBar::new(148.0, 48.0, COMMIT)
    }

    #[test]
    fn starts_idle() {
        let bar = bar();
        assert_eq!(bar.state(), &DragState::Idle);
        assert!(!bar.overlay_visible());
        assert_eq!(bar.hovered_month(), None);
    }

    #[test]
    fn move_while_idle_is_ignored() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_move(50.0, &mapper, t0);
        assert_eq!(bar.offset(), 0.0);
        assert_eq!(bar.poll(t0 + ms(500), &mapper), None);
    }

    #[test]
    fn drag_updates_month_and_commits_after_quiet_period() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        assert!(bar.overlay_visible());
        assert_eq!(bar.hovered_month(), Some("A"));

        bar.pointer_move(70.0, &mapper, t0);
        assert_eq!(bar.hovered_month(), Some("B"));
        assert_eq!(bar.poll(t0 + ms(50), &mapper), None);
        assert_eq!(
            bar.poll(t0 + ms(100), &mapper),
            Some(ScrollCommit { row: 4, item: 11 })
        );
        assert!(bar.is_dragging());
    }

    #[test]
    fn later_moves_supersede_pending_commit() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(10.0, &mapper, t0);
        bar.pointer_move(20.0, &mapper, t0 + ms(50));

        assert_eq!(bar.poll(t0 + ms(120), &mapper), None);
        assert_eq!(
            bar.poll(t0 + ms(150), &mapper),
            Some(ScrollCommit { row: 2, item: 5 })
        );
        assert_eq!(bar.poll(t0 + ms(400), &mapper), None);
    }

    #[test]
    fn handle_is_clamped_to_track() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(500.0, &mapper, t0);
        assert_eq!(bar.offset(), 100.0);
        assert_eq!(bar.pointer_up(&mapper), Some(ScrollCommit { row: 5, item: 12 }));

        bar.pointer_down(&mapper);
        bar.pointer_move(-1000.0, &mapper, t0);
        assert_eq!(bar.offset(), 0.0);
    }

    #[test]
    fn pointer_up_commits_immediately() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(30.0, &mapper, t0);
        assert_eq!(bar.pointer_up(&mapper), Some(ScrollCommit { row: 2, item: 5 }));
        assert_eq!(bar.state(), &DragState::Idle);
        assert!(!bar.overlay_visible());
        assert_eq!(bar.poll(t0 + ms(500), &mapper), None);
    }

    #[test]
    fn cancel_discards_pending_commit() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(60.0, &mapper, t0);
        bar.cancel();
        assert_eq!(bar.state(), &DragState::Idle);
        assert_eq!(bar.deadline(), None);
        assert_eq!(bar.poll(t0 + ms(1000), &mapper), None);
    }

    #[test]
    fn sync_to_row_only_when_idle() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = ScrollBar::new(108.0, 48.0, COMMIT);

        bar.sync_to_row(3, &mapper);
        assert_eq!(bar.offset(), 30.0);

        bar.pointer_down(&mapper);
        bar.sync_to_row(0, &mapper);
        assert_eq!(bar.offset(), 30.0);
    }

    #[test]
    fn empty_list_never_commits() {
        let mapper = ScrollIndexMapper::new(&[], 4, 0);
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(40.0, &mapper, t0);
        assert_eq!(bar.hovered_month(), None);
        assert_eq!(bar.pointer_up(&mapper), None);
    }

    #[test]
    fn plain_list_commit_clamps_item() {
        let items = plain_photos(10);
        let mapper = ScrollIndexMapper::new(&[], 4, items.len());
        let mut bar = bar();
        let t0 = Instant::now();

        bar.pointer_down(&mapper);
        bar.pointer_move(100.0, &mapper, t0);
        assert_eq!(bar.pointer_up(&mapper), Some(ScrollCommit { row: 2, item: 8 }));
    }

    #[test]
    fn shrinking_track_clamps_offset() {
        let (dividers, count) = fixture();
        let mapper = ScrollIndexMapper::new(&dividers, 4, count);
        let mut bar = bar();
        bar.sync_to_row(5, &mapper);
        bar.set_track(98.0);
        assert_eq!(bar.offset(), 50.0);
    }
}
