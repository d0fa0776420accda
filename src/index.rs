//! Grid layout of a gallery item list and the month divider table.
//!
//! The grid has `columns` cells per row. Photos and directories take one
//! cell each; a month divider takes a whole row of its own, so the row
//! before it is padded with empty cells when it is only partly filled:
//!
//! ```text
//! columns = 4, items = [D0 p p p p p D6 p p]
//!
//! row 0 │ D0 ─────────────── │   divider, first_row_index 0
//! row 1 │ p1  p2  p3  p4     │
//! row 2 │ p5  ·   ·   ·      │   padded
//! row 3 │ D6 ─────────────── │   divider, first_row_index 0 + 1 + 2
//! row 4 │ p7  p8             │
//! ```
//!
//! The divider table is rebuilt from scratch whenever the item list or the
//! column count changes.

use crate::scan::ListingError;
use crate::scroll::ScrollIndexMapper;
use crate::snapshot::Publisher;
use crate::types::{GalleryItem, MonthDividerInfo};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// Rows occupied by `photo_count` cells at `columns` per row.
pub fn row_span(photo_count: usize, columns: usize) -> usize {
    photo_count.div_ceil(columns.max(1))
}

/// Column count for a viewport: as many `cell_size` cells as fit, at least
/// one.
pub fn columns_for_width(width: f32, cell_size: f32) -> usize {
    if !(cell_size > 0.0) || !(width > 0.0) {
        return 1;
    }
    ((width / cell_size).floor() as usize).max(1)
}

/// Build the divider table for `items` at `columns` per row.
///
/// `photo_count` counts every cell between a divider and the next one (in
/// the date view these are all photos). Items before the first divider, if
/// any, occupy the leading rows.
pub fn compute_month_dividers(items: &[GalleryItem], columns: usize) -> Vec<MonthDividerInfo> {
    let positions: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_divider())
        .map(|(i, _)| i)
        .collect();

    let leading = positions.first().copied().unwrap_or(items.len());
    let mut next_row = row_span(leading, columns);

    positions
        .iter()
        .enumerate()
        .map(|(k, &item_index)| {
            let end = positions.get(k + 1).copied().unwrap_or(items.len());
            let photo_count = end - item_index - 1;
            let span = row_span(photo_count, columns);
            let info = MonthDividerInfo {
                title: items[item_index].label(),
                item_index,
                photo_count,
                row_span: span,
                first_row_index: next_row,
            };
            next_row += 1 + span;
            info
        })
        .collect()
}

/// What occupies one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// A photo or directory, by logical item index.
    Item(usize),
    /// A month divider spanning the whole row, by logical item index.
    Divider(usize),
    /// Filler that completes a row before a divider.
    Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub kind: CellKind,
}

/// Cells in render order, each tagged with its visual row.
pub fn grid_cells(items: &[GalleryItem], columns: usize) -> Vec<GridCell> {
    let columns = columns.max(1);
    let mut cells = Vec::with_capacity(items.len());
    let mut row = 0;
    let mut col = 0;

    for (i, item) in items.iter().enumerate() {
        if item.is_divider() {
            if col > 0 {
                cells.extend((col..columns).map(|_| GridCell {
                    row,
                    kind: CellKind::Padding,
                }));
                row += 1;
                col = 0;
            }
            cells.push(GridCell {
                row,
                kind: CellKind::Divider(i),
            });
            row += 1;
        } else {
            cells.push(GridCell {
                row,
                kind: CellKind::Item(i),
            });
            col += 1;
            if col == columns {
                row += 1;
                col = 0;
            }
        }
    }
    cells
}

/// Everything the presentation layer needs to render one state of the grid.
#[derive(Debug, Clone)]
pub struct GallerySnapshot {
    pub items: Arc<Vec<GalleryItem>>,
    pub columns: usize,
    pub dividers: Vec<MonthDividerInfo>,
    /// Set when the listing failed; `items` is then empty.
    pub error: Option<String>,
}

impl GallerySnapshot {
    pub fn mapper(&self) -> ScrollIndexMapper<'_> {
        ScrollIndexMapper::new(&self.dividers, self.columns, self.items.len())
    }

    pub fn cells(&self) -> Vec<GridCell> {
        grid_cells(&self.items, self.columns)
    }
}

/// Item list model for one gallery window.
///
/// Holds the current listing and column count, keeps the divider table in
/// step with both, and publishes a [`GallerySnapshot`] on every change that
/// affects rendering.
#[derive(Debug)]
pub struct GalleryIndex {
    cell_size: f32,
    items: Arc<Vec<GalleryItem>>,
    error: Option<String>,
    columns: usize,
    dividers: Vec<MonthDividerInfo>,
    publisher: Publisher<GallerySnapshot>,
}

impl GalleryIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            items: Arc::new(Vec::new()),
            error: None,
            columns: 1,
            dividers: Vec::new(),
            publisher: Publisher::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<Arc<GallerySnapshot>> {
        self.publisher.subscribe()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn dividers(&self) -> &[MonthDividerInfo] {
        &self.dividers
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mapper(&self) -> ScrollIndexMapper<'_> {
        ScrollIndexMapper::new(&self.dividers, self.columns, self.items.len())
    }

    /// Replace the item list with a freshly built one.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) -> Arc<GallerySnapshot> {
        self.items = Arc::new(items);
        self.error = None;
        self.rebuild()
    }

    /// Apply the outcome of a listing. A failure shows as an empty list with
    /// the error text.
    pub fn set_listing(
        &mut self,
        listing: Result<Vec<GalleryItem>, ListingError>,
    ) -> Arc<GallerySnapshot> {
        match listing {
            Ok(items) => self.set_items(items),
            Err(err) => {
                tracing::warn!(error = %err, "listing failed");
                self.items = Arc::new(Vec::new());
                self.error = Some(err.to_string());
                self.rebuild()
            }
        }
    }

    /// Viewport resized. Publishes only if the column count changed.
    pub fn set_width(&mut self, width: f32) -> Option<Arc<GallerySnapshot>> {
        let columns = columns_for_width(width, self.cell_size);
        if columns == self.columns {
            return None;
        }
        self.columns = columns;
        Some(self.rebuild())
    }

    fn rebuild(&mut self) -> Arc<GallerySnapshot> {
        self.dividers = compute_month_dividers(&self.items, self.columns);
        tracing::debug!(
            items = self.items.len(),
            columns = self.columns,
            dividers = self.dividers.len(),
            "rebuilt gallery index"
        );
        self.publisher.publish(GallerySnapshot {
            items: Arc::clone(&self.items),
            columns: self.columns,
            dividers: self.dividers.clone(),
            error: self.error.clone(),
        })
    }
}
