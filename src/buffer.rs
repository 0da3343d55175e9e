//! Pixel buffer helpers.
//!
//! The engine works on [`image::RgbaImage`]: width, height and tightly packed
//! RGBA bytes. Decoding and encoding stay with the caller.

use image::RgbaImage;

/// Allocates a zero-filled (transparent black) buffer with the same size.
pub fn blank_like(image: &RgbaImage) -> RgbaImage {
    RgbaImage::new(image.width(), image.height())
}

/// Returns true if both images have the same dimensions and identical bytes.
pub fn images_equal(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}
