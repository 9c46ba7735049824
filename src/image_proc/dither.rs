//! Floyd-Steinberg error diffusion engine.
//!
//! Scans the buffer in raster order (top-to-bottom, left-to-right), quantizes
//! each pixel's R,G,B to the binary extremes and diffuses the residual error
//! into the four forward neighbors. The scan order is part of the contract:
//! error may only flow into pixels that have not been visited yet, so the
//! engine is strictly sequential over one buffer.

use thiserror::Error;

use super::buffer::PixelBuffer;
use super::grayscale;
use super::quantize::quantize;
use super::Params;

/// Dithering errors
#[derive(Error, Debug, PartialEq)]
pub enum DitherError {
    #[error("cannot dither a {width}x{height} buffer")]
    InvalidDimensions { width: u32, height: u32 },
}

/// The fixed Floyd-Steinberg kernel: relative offset and weight for each of
/// the four forward neighbors, applied in this order. The weights are exact
/// binary fractions summing to 1.
const KERNEL: [(i64, i64, f64); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Dither the buffer in place
///
/// When `params.grayscale` is set, R,G,B are first collapsed to a shared
/// luminance value. Inputs are validated before any mutation: a zero-sized
/// buffer is rejected and left untouched.
pub fn dither(buffer: &mut PixelBuffer, params: &Params) -> Result<(), DitherError> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(DitherError::InvalidDimensions {
            width: buffer.width(),
            height: buffer.height(),
        });
    }

    if params.grayscale {
        grayscale::to_grayscale(buffer);
    }

    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let px = buffer.sample_mut(x, y);
            let mut error = [0.0; 3];
            for c in 0..3 {
                let q = quantize(px[c]);
                px[c] = q.value;
                error[c] = q.error;
            }
            diffuse(buffer, x as i64, y as i64, error);
        }
    }

    Ok(())
}

/// Add the weighted error to the four forward neighbors of `(x, y)`
///
/// Targets outside the buffer are silently skipped; no wraparound and no
/// coordinate clamping. Border pixels therefore under-diffuse, and the
/// bottom-right corner drops its error entirely. Accumulation happens on the
/// raw floating samples, never on quantized values.
fn diffuse(buffer: &mut PixelBuffer, x: i64, y: i64, error: [f64; 3]) {
    for (dx, dy, weight) in KERNEL {
        let (nx, ny) = (x + dx, y + dy);
        if !buffer.contains(nx, ny) {
            continue;
        }
        let px = buffer.sample_mut(nx as u32, ny as u32);
        for c in 0..3 {
            px[c] += error[c] * weight;
        }
    }
}
