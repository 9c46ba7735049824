//! Integer-factor resampling around the dithering pass.
//!
//! Dithering a smaller buffer and block-replicating it back up makes the
//! diffusion pattern coarser in proportion to the factor. The same factor
//! must be used on both sides so the output geometry matches the source.

use image::imageops::{self, FilterType};
use thiserror::Error;

use super::buffer::PixelBuffer;

/// Resampling errors
#[derive(Error, Debug, PartialEq)]
pub enum ResampleError {
    #[error("unsupported scale factor {0}, must be at least 1")]
    UnsupportedFactor(u32),
}

/// Shrink the buffer to `(width/factor, height/factor)` (floor division)
///
/// Pre-dither smoothing quality is delegated to the image crate's resize;
/// the triangle filter is used here. A factor of 1 is an exact copy.
pub fn downscale(buffer: &PixelBuffer, factor: u32) -> Result<PixelBuffer, ResampleError> {
    if factor < 1 {
        return Err(ResampleError::UnsupportedFactor(factor));
    }
    if factor == 1 {
        return Ok(buffer.clone());
    }

    let new_width = buffer.width() / factor;
    let new_height = buffer.height() / factor;
    if new_width == 0 || new_height == 0 {
        // a factor beyond the image extent floors to an empty buffer, which
        // the dither stage rejects
        return Ok(PixelBuffer::new_filled(new_width, new_height, 0.0));
    }
    tracing::debug!(
        "Downscaling {}x{} -> {}x{} (factor {})",
        buffer.width(),
        buffer.height(),
        new_width,
        new_height,
        factor
    );

    let resized = imageops::resize(&buffer.to_rgba(), new_width, new_height, FilterType::Triangle);
    Ok(PixelBuffer::from_rgba(&resized))
}

/// Enlarge the buffer to `(width*factor, height*factor)` by exact block
/// replication
///
/// Every source pixel fills a factor×factor block, all four channels copied
/// unchanged. No interpolation: interpolating would reintroduce intermediate
/// tones into the binary dithered output.
pub fn upscale(buffer: &PixelBuffer, factor: u32) -> Result<PixelBuffer, ResampleError> {
    if factor < 1 {
        return Err(ResampleError::UnsupportedFactor(factor));
    }
    if factor == 1 {
        return Ok(buffer.clone());
    }

    let mut out = PixelBuffer::new_filled(buffer.width() * factor, buffer.height() * factor, 0.0);
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let src = buffer.sample(x, y);
            for dy in 0..factor {
                for dx in 0..factor {
                    out.sample_mut(x * factor + dx, y * factor + dy)
                        .copy_from_slice(&src);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new_filled(width, height, 0.0);
        for y in 0..height {
            for x in 0..width {
                let base = (y * width + x) as f64 * 4.0;
                buf.set(x as i64, y as i64, [base, base + 1.0, base + 2.0, base + 3.0])
                    .unwrap();
            }
        }
        buf
    }

    #[test]
    fn upscale_replicates_blocks_exactly() {
        let src = distinct_buffer(2, 3);
        let up = upscale(&src, 3).unwrap();

        assert_eq!(up.width(), 6);
        assert_eq!(up.height(), 9);
        for y in 0..9u32 {
            for x in 0..6u32 {
                assert_eq!(up.sample(x, y), src.sample(x / 3, y / 3), "at ({x},{y})");
            }
        }
    }

    #[test]
    fn factor_one_is_identity() {
        let src = distinct_buffer(3, 2);
        assert_eq!(upscale(&src, 1).unwrap(), src);
        assert_eq!(downscale(&src, 1).unwrap(), src);
    }

    #[test]
    fn downscale_floors_dimensions() {
        let src = distinct_buffer(7, 5);
        let down = downscale(&src, 2).unwrap();
        assert_eq!(down.width(), 3);
        assert_eq!(down.height(), 2);
    }

    #[test]
    fn factor_zero_is_rejected() {
        let src = distinct_buffer(2, 2);
        assert_eq!(downscale(&src, 0), Err(ResampleError::UnsupportedFactor(0)));
        assert_eq!(upscale(&src, 0), Err(ResampleError::UnsupportedFactor(0)));
    }

    #[test]
    fn down_then_up_keeps_geometry_but_not_content() {
        // lossy by design: the round trip reproduces blocky structure at the
        // original scale, not the original samples
        let src = distinct_buffer(4, 4);
        let round = upscale(&downscale(&src, 2).unwrap(), 2).unwrap();
        assert_eq!(round.width(), src.width());
        assert_eq!(round.height(), src.height());
        assert_ne!(round, src);
    }
}
