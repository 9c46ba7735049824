//! Grayscale reduction pre-pass.
//!
//! Collapses R,G,B to a shared luminance value before dithering so the engine
//! quantizes a single tone per pixel. The luma weighting is delegated to the
//! image crate's own RGB-to-luma conversion.

use image::{Luma, Pixel, Rgb};

use super::buffer::PixelBuffer;

/// Replace each pixel's R,G,B with a shared luminance value, leaving alpha
/// untouched
///
/// Samples are taken at 8-bit precision for the luma conversion, which makes
/// the operation exactly idempotent: a pixel that is already `(l, l, l)` maps
/// to `l` again.
pub fn to_grayscale(buffer: &mut PixelBuffer) {
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let px = buffer.sample_mut(x, y);
            let rgb = Rgb([to_u8(px[0]), to_u8(px[1]), to_u8(px[2])]);
            let Luma([l]) = rgb.to_luma();
            px[0] = l as f64;
            px[1] = l as f64;
            px[2] = l as f64;
        }
    }
}

fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_buffer() -> PixelBuffer {
        let mut buf = PixelBuffer::new_filled(2, 2, 0.0);
        buf.set(0, 0, [200.0, 30.0, 90.0, 255.0]).unwrap();
        buf.set(1, 0, [0.0, 255.0, 0.0, 128.0]).unwrap();
        buf.set(0, 1, [17.0, 17.0, 17.0, 255.0]).unwrap();
        buf.set(1, 1, [255.0, 0.0, 255.0, 0.0]).unwrap();
        buf
    }

    #[test]
    fn channels_become_equal() {
        let mut buf = color_buffer();
        to_grayscale(&mut buf);
        for y in 0..2 {
            for x in 0..2 {
                let [r, g, b, _] = buf.sample(x, y);
                assert_eq!(r, g);
                assert_eq!(g, b);
            }
        }
    }

    #[test]
    fn alpha_is_untouched() {
        let mut buf = color_buffer();
        to_grayscale(&mut buf);
        assert_eq!(buf.sample(0, 0)[3], 255.0);
        assert_eq!(buf.sample(1, 0)[3], 128.0);
        assert_eq!(buf.sample(1, 1)[3], 0.0);
    }

    #[test]
    fn idempotent() {
        let mut once = color_buffer();
        to_grayscale(&mut once);
        let mut twice = once.clone();
        to_grayscale(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn already_gray_pixels_are_fixed_points() {
        let mut buf = PixelBuffer::new_filled(1, 1, 0.0);
        buf.set(0, 0, [17.0, 17.0, 17.0, 255.0]).unwrap();
        to_grayscale(&mut buf);
        assert_eq!(buf.sample(0, 0), [17.0, 17.0, 17.0, 255.0]);
    }
}
