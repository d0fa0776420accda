//! EXIF orientation correction.
//!
//! Cameras store pixels in sensor order and record how the picture should be
//! turned in the EXIF `Orientation` tag (values 1-8). [`Orientation`] maps
//! the tag value; the pixels are turned with `image::imageops`.

use super::raster::RasterImage;
use image::imageops;

/// EXIF orientation tag values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// 1: stored upright.
    #[default]
    Normal,
    /// 2: mirrored left/right.
    FlipHorizontal,
    /// 3: upside down.
    Rotate180,
    /// 4: mirrored top/bottom.
    FlipVertical,
    /// 5: mirrored along the main diagonal.
    Transpose,
    /// 6: needs a 90° clockwise turn.
    Rotate90,
    /// 7: mirrored along the anti-diagonal.
    Transverse,
    /// 8: needs a 90° counter-clockwise turn.
    Rotate270,
}

impl Orientation {
    /// Map a raw tag value. Anything outside 1–8 is treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Whether correction swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    /// Output size for a `(width, height)` source.
    pub fn corrected_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Turn `image` upright.
    pub fn apply(self, image: RasterImage) -> RasterImage {
        if self == Self::Normal {
            return image;
        }
        let buffer = image.to_rgba_image();
        let upright = match self {
            Self::Normal => buffer,
            Self::FlipHorizontal => imageops::flip_horizontal(&buffer),
            Self::Rotate180 => imageops::rotate180(&buffer),
            Self::FlipVertical => imageops::flip_vertical(&buffer),
            Self::Transpose => imageops::flip_horizontal(&imageops::rotate90(&buffer)),
            Self::Rotate90 => imageops::rotate90(&buffer),
            Self::Transverse => imageops::flip_vertical(&imageops::rotate90(&buffer)),
            Self::Rotate270 => imageops::rotate270(&buffer),
        };
        RasterImage::from(upright)
    }
}
