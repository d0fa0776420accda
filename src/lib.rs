//! # Gallery Core
//!
//! The non-UI core of a desktop photo gallery: a two-tier image cache that
//! feeds grid thumbnails and full-size photos, and the index arithmetic that
//! lets a month-labelled scrollbar drive a virtualized grid.
//!
//! The presentation layer (windows, widgets, input) is a client of this
//! crate. It asks for item lists and images, renders whatever snapshot it
//! last received, and forwards pointer and key events to the state machines
//! here.
//!
//! # Data Flow
//!
//! ```text
//! directory ──scan──▶ Vec<GalleryItem> ──index──▶ GallerySnapshot ──▶ render grid
//!                                                     │
//!                            ScrollIndexMapper ◀──────┘
//!                                  │
//! scrollbar drag ──ScrollBar──▶ row ↔ item ↔ month label ──▶ scroll list
//!
//! visible photo ──ImageResolver──▶ memory ▸ disk ▸ decode ──▶ RasterImage
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Folder view and date view listings |
//! | [`index`] | Month divider table, grid layout, the `GalleryIndex` model |
//! | [`scroll`] | Row/item mapping and the scrollbar drag state machine |
//! | [`resolve`] | Image resolution pipeline, in-flight dedupe, view-scoped requests |
//! | [`cache`] | Memory tiers (insertion-order eviction) and the disk thumbnail tier |
//! | [`imaging`] | `ImageCodec` trait, decoding, EXIF orientation, resizing |
//! | [`viewer`] | Full-size viewer navigation with debounced arrow keys |
//! | [`debounce`] | Quiet-period debouncer used by the scrollbar and viewer |
//! | [`snapshot`] | Publishes immutable snapshots to subscribers |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`settings`] | Last-used directory and view mode (`settings.json`) |
//! | [`types`] | Shared types: `GalleryItem`, `MonthDividerInfo`, `LoadState` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Insertion-Order Eviction
//!
//! The memory tiers evict the oldest *inserted* key, and reads never promote.
//! A thumbnail scrolled past long ago goes first even if it was just looked
//! at again; the grid re-requests visible cells on every render, so
//! promotion on read would keep a whole screen pinned for no benefit.
//!
//! ## One Decode Per Key
//!
//! Two grid cells (or a cell and the viewer) asking for the same image at
//! the same time share one decode. Failures are shared too but never cached:
//! the next request tries again.
//!
//! ## A Single Resize Worker
//!
//! Decoding and file I/O use the rayon pool; resizing runs on one dedicated
//! thread. Resizing is the CPU-heavy step, and serializing it keeps the UI
//! thread responsive while a large folder fills in.
//!
//! ## No Staleness Check
//!
//! Cached thumbnails are served by path alone. Editing a photo in place
//! leaves the old thumbnail on disk until the cache directory is cleared.
//!
//! ## Snapshots, Not Shared State
//!
//! Models publish immutable snapshots over channels. The presentation layer
//! never reads model internals, so a rebuild can never be observed half done.

pub mod cache;
pub mod config;
pub mod debounce;
pub mod imaging;
pub mod index;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod scroll;
pub mod settings;
pub mod snapshot;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
