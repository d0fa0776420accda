//! Pure Rust codec built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP, ICO, GIF) | `image::ImageReader` with content sniffing |
//! | Orientation | `kamadak-exif`, primary IFD `Orientation` tag |
//! | Resize | `image::imageops::resize` with `Triangle` filter |
//! | Upright | [`Orientation::apply`](super::orientation::Orientation::apply) |

use super::calculations::fit_within;
use super::codec::{CodecError, ImageCodec};
use super::orientation::Orientation;
use super::raster::RasterImage;
use image::ImageReader;
use image::imageops::FilterType;
use std::path::Path;

/// Codec using the `image` crate for pixels and `kamadak-exif` for metadata.
///
/// Previews favour speed over quality, so the default filter is `Triangle`.
pub struct RustCodec {
    filter: FilterType,
}

impl RustCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw EXIF orientation value, if the file carries one in range.
fn read_exif_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = std::io::BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    match field.value.get_uint(0) {
        Some(v @ 1..=8) => Some(v),
        _ => None,
    }
}

impl ImageCodec for RustCodec {
    fn decode(&self, path: &Path) -> Result<RasterImage, CodecError> {
        let decode_err = |message: String| CodecError::Decode {
            path: path.to_path_buf(),
            message,
        };
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        Ok(RasterImage::from(img))
    }

    fn read_orientation(&self, path: &Path) -> Orientation {
        read_exif_orientation(path)
            .map(Orientation::from_exif)
            .unwrap_or_default()
    }

    fn resize(&self, image: &RasterImage, max_edge: u32) -> RasterImage {
        let (w, h) = fit_within(image.dimensions(), max_edge);
        if (w, h) == image.dimensions() {
            return image.clone();
        }
        let resized = image::imageops::resize(&image.to_rgba_image(), w, h, self.filter);
        RasterImage::from(resized)
    }
}
