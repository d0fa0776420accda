//! Decoded RGBA8 raster shared between cache tiers and the presentation layer.

use image::RgbaImage;

/// Bytes per pixel of the RGBA8 buffer.
pub const CHANNELS: usize = 4;

/// An immutable RGBA8 bitmap.
///
/// Fields are private so the buffer length always matches
/// `width * height * 4`; once built the raster is only read. Caches hold it
/// behind an `Arc` and hand out clones of that `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer. Returns `None` when the buffer length does not
    /// match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(CHANNELS)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.pixels[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy into an `image` buffer for encoding or resampling.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .expect("raster buffer length matches its dimensions")
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

impl From<image::DynamicImage> for RasterImage {
    fn from(img: image::DynamicImage) -> Self {
        img.into_rgba8().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_rejects_wrong_length() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(RasterImage::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = RasterImage::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(img.pixels().len(), 24);
        assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn converts_through_image_buffer() {
        let img = RasterImage::solid(4, 3, [9, 8, 7, 255]);
        let buffer = img.to_rgba_image();
        assert_eq!(buffer.dimensions(), (4, 3));
        let back = RasterImage::from(buffer);
        assert_eq!(back, img);
    }
}
