//! Image processing module.
//!
//! Provides source intake, the Floyd-Steinberg dithering core, and the
//! downscale/dither/upscale pipeline that ties them together.

pub mod buffer;
pub mod dither;
pub mod fetch;
pub mod grayscale;
pub mod quantize;
pub mod resample;

pub use buffer::{BufferError, PixelBuffer};
pub use dither::{dither, DitherError};
pub use fetch::{fetch_image, FetchError};
pub use resample::{downscale, upscale, ResampleError};

use image::{imageops::FilterType, DynamicImage, RgbaImage};
use thiserror::Error;

/// Image processing errors
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Dither error: {0}")]
    Dither(#[from] DitherError),

    #[error("Resample error: {0}")]
    Resample(#[from] ResampleError),

    #[error("Image encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("No source image loaded")]
    NoSourceImage,
}

/// Tunable parameters for one dithering pass
///
/// Immutable for the duration of a pass; a change triggers a full reprocess
/// from the stored source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Collapse R,G,B to luminance before dithering
    pub grayscale: bool,
    /// Integer downscale divisor and upscale multiplier, >= 1
    pub scale_factor: u32,
}

/// Run the full dithering pipeline on a decoded source image
///
/// Downscale by the factor, dither in place (grayscale pre-pass inside the
/// engine), then block-replicate back up by the same factor. Pure and
/// synchronous; the caller owns the buffer end-to-end, so independent images
/// can be processed concurrently without shared state.
pub fn process_image(source: &RgbaImage, params: &Params) -> Result<RgbaImage, ProcessingError> {
    tracing::info!(
        "Processing {}x{} image (factor {}, grayscale: {})",
        source.width(),
        source.height(),
        params.scale_factor,
        params.grayscale
    );

    let mut buffer = resample::downscale(&PixelBuffer::from_rgba(source), params.scale_factor)?;
    dither::dither(&mut buffer, params)?;
    let out = resample::upscale(&buffer, params.scale_factor)?;

    tracing::debug!("Pipeline complete, output {}x{}", out.width(), out.height());
    Ok(out.to_rgba())
}

/// Shrink oversized sources so the dither pattern is consistent across
/// source resolutions
///
/// Sources already within `max_dimension` pass through untouched.
pub fn normalize_source(img: &DynamicImage, max_dimension: u32) -> RgbaImage {
    let (width, height) = (img.width(), img.height());
    if width.max(height) <= max_dimension {
        return img.to_rgba8();
    }

    tracing::debug!(
        "Normalizing {}x{} source to fit {}px",
        width,
        height,
        max_dimension
    );
    img.resize(max_dimension, max_dimension, FilterType::Triangle)
        .to_rgba8()
}

/// Encode an image as PNG into memory
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ProcessingError> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([
                ((x * 23 + y * 31) % 256) as u8,
                ((x * 7 + y * 13) % 256) as u8,
                ((x * 41 + y * 3) % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn pipeline_output_dimensions_follow_the_factor() {
        let src = gradient_image(9, 7);
        let out = process_image(&src, &Params { grayscale: false, scale_factor: 2 }).unwrap();
        // floor(9/2)*2 x floor(7/2)*2
        assert_eq!(out.dimensions(), (8, 6));
    }

    #[test]
    fn pipeline_output_is_binary() {
        let src = gradient_image(8, 8);
        let out = process_image(&src, &Params { grayscale: false, scale_factor: 2 }).unwrap();
        for px in out.pixels() {
            for v in &px.0[..3] {
                assert!(*v == 0 || *v == 255);
            }
            assert_eq!(px.0[3], 255);
        }
    }

    #[test]
    fn factor_larger_than_source_fails_before_dithering() {
        let src = gradient_image(5, 4);
        let err = process_image(&src, &Params { grayscale: false, scale_factor: 10 }).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Dither(DitherError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn grayscale_pipeline_emits_equal_channels() {
        let src = gradient_image(6, 6);
        let out = process_image(&src, &Params { grayscale: true, scale_factor: 1 }).unwrap();
        for px in out.pixels() {
            assert_eq!(px.0[0], px.0[1]);
            assert_eq!(px.0[1], px.0[2]);
        }
    }

    #[test]
    fn normalize_source_caps_the_long_edge() {
        let big = DynamicImage::ImageRgba8(gradient_image(400, 200));
        let normalized = normalize_source(&big, 100);
        assert_eq!(normalized.dimensions(), (100, 50));

        let small = DynamicImage::ImageRgba8(gradient_image(40, 20));
        assert_eq!(normalize_source(&small, 100).dimensions(), (40, 20));
    }

    #[test]
    fn encode_png_round_trips() {
        let src = gradient_image(4, 4);
        let png = encode_png(&src).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, src);
    }
}
