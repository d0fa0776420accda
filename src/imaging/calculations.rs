//! Pure dimension math for preview generation.
//!
//! No I/O and no pixels: these functions are unit tested on numbers alone.

/// Scale `source` to fit inside a `max_edge` × `max_edge` box, keeping the
/// aspect ratio. The longer edge becomes `max_edge`; images already inside
/// the box are returned unchanged (previews never upscale).
///
/// # Examples
/// ```
/// # use gallery_core::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 384), (384, 288));
/// assert_eq!(fit_within((3000, 4000), 384), (288, 384));
/// assert_eq!(fit_within((200, 100), 384), (200, 100));
/// ```
pub fn fit_within(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    if w <= max_edge && h <= max_edge {
        return (w, h);
    }

    if w >= h {
        let scaled_h = (h as f64 * max_edge as f64 / w as f64).round() as u32;
        (max_edge, scaled_h.max(1))
    } else {
        let scaled_w = (w as f64 * max_edge as f64 / h as f64).round() as u32;
        (scaled_w.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_fits_on_width() {
        assert_eq!(fit_within((1920, 1080), 384), (384, 216));
    }

    #[test]
    fn portrait_fits_on_height() {
        assert_eq!(fit_within((1080, 1920), 384), (216, 384));
    }

    #[test]
    fn square_fits_both_edges() {
        assert_eq!(fit_within((1000, 1000), 384), (384, 384));
    }

    #[test]
    fn small_image_not_upscaled() {
        assert_eq!(fit_within((100, 50), 384), (100, 50));
        assert_eq!(fit_within((384, 384), 384), (384, 384));
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel() {
        assert_eq!(fit_within((100_000, 10), 384), (384, 1));
    }
}
