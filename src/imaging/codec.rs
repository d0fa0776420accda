//! Image codec trait and shared error type.
//!
//! The [`ImageCodec`] trait is the seam between the cache pipeline and the
//! pixel work: decode a file, read its EXIF orientation, resize, turn
//! upright. The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec); tests plug in a mock that
//! records calls.

use super::orientation::Orientation;
use super::raster::RasterImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Image load interrupted before completion")]
    Interrupted,
}

/// Decode and resize capability supplied to the resolver.
///
/// Implementations must be `Send + Sync`: the resolver calls them from the
/// I/O pool and from the dedicated resize worker at the same time.
pub trait ImageCodec: Send + Sync {
    /// Read and decode a full-resolution image.
    fn decode(&self, path: &Path) -> Result<RasterImage, CodecError>;

    /// EXIF orientation of the file. Unreadable metadata means upright.
    fn read_orientation(&self, path: &Path) -> Orientation;

    /// Scale `image` to fit inside a `max_edge` square.
    fn resize(&self, image: &RasterImage, max_edge: u32) -> RasterImage;

    /// Turn `image` upright.
    fn apply_orientation(&self, image: RasterImage, orientation: Orientation) -> RasterImage {
        orientation.apply(image)
    }
}
