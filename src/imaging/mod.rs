//! Image decoding, orientation and resizing.
//!
//! | Operation | Where |
//! |---|---|
//! | **Decode** | [`ImageCodec::decode`] ([`RustCodec`]: `image` crate) |
//! | **Orientation** | [`ImageCodec::read_orientation`] (`kamadak-exif`) + [`Orientation::apply`] |
//! | **Resize** | [`ImageCodec::resize`] + [`fit_within`] |
//!
//! The module is split into:
//! - **Raster**: the immutable RGBA8 bitmap every cache tier stores
//! - **Calculations**: pure dimension math (unit testable)
//! - **Orientation**: EXIF orientation values and pixel remapping
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]

mod calculations;
pub mod codec;
pub mod orientation;
pub mod raster;
pub mod rust_codec;

pub use calculations::fit_within;
pub use codec::{CodecError, ImageCodec};
pub use orientation::Orientation;
pub use raster::RasterImage;
pub use rust_codec::RustCodec;
