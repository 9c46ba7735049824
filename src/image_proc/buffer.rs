//! Pixel buffer substrate for the dithering pipeline.
//!
//! A `PixelBuffer` owns a width×height grid of 4-channel (R,G,B,A) samples in
//! row-major order with the origin at the top-left. Samples are stored as f64
//! because error diffusion accumulates fractional error on raw values; the
//! conversion to and from 8-bit image data happens at the pipeline boundary.

use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Number of channels per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Pixel buffer access errors
#[derive(Error, Debug, PartialEq)]
pub enum BufferError {
    #[error("coordinate ({x}, {y}) outside buffer extent {width}x{height}")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
}

/// Owned RGBA sample grid
///
/// Invariant: `samples.len() == width * height * CHANNELS`. The buffer itself
/// never clamps values; callers store whatever they computed and clamping
/// happens only when converting back to 8-bit image data.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<f64>,
}

impl PixelBuffer {
    /// Allocate a buffer with every sample set to `fill`
    pub fn new_filled(width: u32, height: u32, fill: f64) -> Self {
        let len = width as usize * height as usize * CHANNELS;
        Self {
            width,
            height,
            samples: vec![fill; len],
        }
    }

    /// Build a buffer from decoded 8-bit RGBA image data
    pub fn from_rgba(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let samples = img.as_raw().iter().map(|&s| s as f64).collect();
        Self {
            width,
            height,
            samples,
        }
    }

    /// Convert back to an 8-bit RGBA image, rounding and clamping each sample
    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let px = self.sample(x, y);
            Rgba([
                clamp_to_u8(px[0]),
                clamp_to_u8(px[1]),
                clamp_to_u8(px[2]),
                clamp_to_u8(px[3]),
            ])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a signed coordinate falls inside the buffer extent
    ///
    /// Coordinates are signed because diffusion neighbor offsets may fall
    /// outside `[0, width) x [0, height)`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Read one pixel, failing if the coordinate is out of bounds
    pub fn get(&self, x: i64, y: i64) -> Result<[f64; CHANNELS], BufferError> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(self.sample(x as u32, y as u32))
    }

    /// Write one pixel, failing if the coordinate is out of bounds
    ///
    /// Values are stored as provided, without clamping.
    pub fn set(&mut self, x: i64, y: i64, value: [f64; CHANNELS]) -> Result<(), BufferError> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.sample_mut(x as u32, y as u32).copy_from_slice(&value);
        Ok(())
    }

    /// Copy out one pixel; coordinate must be in range
    pub(crate) fn sample(&self, x: u32, y: u32) -> [f64; CHANNELS] {
        let i = self.offset(x, y);
        [
            self.samples[i],
            self.samples[i + 1],
            self.samples[i + 2],
            self.samples[i + 3],
        ]
    }

    /// Mutable view of one pixel's channels; coordinate must be in range
    pub(crate) fn sample_mut(&mut self, x: u32, y: u32) -> &mut [f64] {
        let i = self.offset(x, y);
        &mut self.samples[i..i + CHANNELS]
    }

    /// Flat index of a pixel: `(x + y * width) * 4`
    fn offset(&self, x: u32, y: u32) -> usize {
        (x as usize + y as usize * self.width as usize) * CHANNELS
    }

    fn out_of_bounds(&self, x: i64, y: i64) -> BufferError {
        BufferError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

fn clamp_to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_filled_sets_every_sample() {
        let buf = PixelBuffer::new_filled(3, 2, 128.0);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.sample(x, y), [128.0; 4]);
            }
        }
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut buf = PixelBuffer::new_filled(2, 2, 0.0);
        buf.set(1, 0, [10.5, -3.0, 300.0, 255.0]).unwrap();
        // stored as provided, no clamping
        assert_eq!(buf.get(1, 0).unwrap(), [10.5, -3.0, 300.0, 255.0]);
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let mut buf = PixelBuffer::new_filled(2, 2, 0.0);
        assert!(matches!(
            buf.get(2, 0),
            Err(BufferError::OutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(matches!(
            buf.get(-1, 1),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert!(matches!(
            buf.set(0, 2, [0.0; 4]),
            Err(BufferError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn contains_matches_extent() {
        let buf = PixelBuffer::new_filled(4, 3, 0.0);
        assert!(buf.contains(0, 0));
        assert!(buf.contains(3, 2));
        assert!(!buf.contains(4, 2));
        assert!(!buf.contains(3, 3));
        assert!(!buf.contains(-1, 0));
    }

    #[test]
    fn rgba_round_trip_preserves_8bit_data() {
        let img = RgbaImage::from_fn(3, 2, |x, y| {
            image::Rgba([(x * 40) as u8, (y * 90) as u8, 7, 255])
        });
        let buf = PixelBuffer::from_rgba(&img);
        assert_eq!(buf.to_rgba(), img);
    }

    #[test]
    fn to_rgba_rounds_and_clamps() {
        let mut buf = PixelBuffer::new_filled(1, 1, 0.0);
        buf.set(0, 0, [-12.0, 254.6, 300.0, 128.4]).unwrap();
        let img = buf.to_rgba();
        assert_eq!(img.get_pixel(0, 0).0, [0, 255, 255, 128]);
    }
}
