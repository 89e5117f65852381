//! Pixel-level helpers shared by the formats.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Opaque black.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Opaque white.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Padding added around an image, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Border {
    /// Left edge.
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Right edge.
    pub right: u32,
    /// Bottom edge.
    pub bottom: u32,
}

impl Border {
    /// Padding per side.
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same padding on every side.
    #[must_use]
    pub const fn uniform(width: u32) -> Self {
        Self::new(width, width, width, width)
    }

    /// Padding below the image only.
    #[must_use]
    pub const fn below(height: u32) -> Self {
        Self::new(0, 0, 0, height)
    }
}

/// Returns a larger canvas filled with `fill` and the image placed inside the border.
#[must_use]
pub fn expand(image: &RgbaImage, border: Border, fill: Rgba<u8>) -> RgbaImage {
    let width = image.width() + border.left + border.right;
    let height = image.height() + border.top + border.bottom;
    let mut out = RgbaImage::from_pixel(width, height, fill);
    imageops::replace(
        &mut out,
        image,
        i64::from(border.left),
        i64::from(border.top),
    );
    out
}

/// Rounds the corners of an opaque copy of the image over `fill`.
///
/// The mask is built on a copy scaled up by `supersample` and the result is
/// scaled back down, which anti-aliases the curve. `radius` is measured on the
/// scaled copy.
#[must_use]
pub fn round_corners(image: &RgbaImage, radius: u32, supersample: u32, fill: Rgba<u8>) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let factor = supersample.max(1);
    let big = imageops::resize(image, width * factor, height * factor, FilterType::Triangle);
    let (big_w, big_h) = big.dimensions();
    let r = f64::from(radius.min(big_w / 2).min(big_h / 2));

    let mut composed = RgbaImage::from_pixel(big_w, big_h, fill);
    for (x, y, pixel) in big.enumerate_pixels() {
        if inside_rounded_rect(f64::from(x) + 0.5, f64::from(y) + 0.5, f64::from(big_w), f64::from(big_h), r) {
            let mut base = fill;
            blend(&mut base, *pixel, 1.0);
            composed.put_pixel(x, y, base);
        }
    }

    imageops::resize(&composed, width, height, FilterType::Triangle)
}

fn inside_rounded_rect(px: f64, py: f64, width: f64, height: f64, r: f64) -> bool {
    if r <= 0.0 {
        return true;
    }
    let cx = if px < r {
        r
    } else if px > width - r {
        width - r
    } else {
        return true;
    };
    let cy = if py < r {
        r
    } else if py > height - r {
        height - r
    } else {
        return true;
    };
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

/// Alpha-blends `color` onto the pixel at `(x, y)` scaled by `coverage`.
/// Coordinates outside the canvas are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    blend(canvas.get_pixel_mut(x, y), color, coverage);
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(src[3]) / 255.0;
    if alpha <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let mixed = f32::from(src[channel]).mul_add(alpha, f32::from(dst[channel]) * (1.0 - alpha));
        dst[channel] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    let dst_alpha = f32::from(dst[3]) / 255.0;
    dst[3] = (255.0 * dst_alpha.mul_add(1.0 - alpha, alpha)).round().clamp(0.0, 255.0) as u8;
}

/// Draws `src` with its alpha channel over the canvas at `(x, y)`.
pub fn paste(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(canvas, src, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_places_image_inside_border() {
        let src = RgbaImage::from_pixel(4, 2, WHITE);
        let out = expand(&src, Border::new(1, 2, 3, 4), BLACK);

        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(*out.get_pixel(0, 0), BLACK);
        assert_eq!(*out.get_pixel(1, 2), WHITE);
        assert_eq!(*out.get_pixel(4, 3), WHITE);
        assert_eq!(*out.get_pixel(5, 3), BLACK);
    }

    #[test]
    fn test_round_corners_keeps_size_and_fills_corner() {
        let src = RgbaImage::from_pixel(60, 40, WHITE);
        let dark = Rgba([21, 32, 43, 255]);
        let out = round_corners(&src, 60, 3, dark);

        assert_eq!(out.dimensions(), (60, 40));
        assert_eq!(*out.get_pixel(0, 0), dark);
        assert_eq!(*out.get_pixel(30, 20), WHITE);
    }

    #[test]
    fn test_blend_pixel_ignores_out_of_bounds() {
        let mut canvas = RgbaImage::from_pixel(2, 2, BLACK);
        blend_pixel(&mut canvas, -1, 0, WHITE, 1.0);
        blend_pixel(&mut canvas, 5, 5, WHITE, 1.0);
        blend_pixel(&mut canvas, 1, 1, WHITE, 1.0);

        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
        assert_eq!(*canvas.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn test_half_coverage_mixes_colors() {
        let mut canvas = RgbaImage::from_pixel(1, 1, BLACK);
        blend_pixel(&mut canvas, 0, 0, WHITE, 0.5);

        let value = canvas.get_pixel(0, 0)[0];
        assert!((127..=128).contains(&value));
    }
}
