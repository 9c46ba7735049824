//! Binary channel quantization.
//!
//! Maps a single diffusion-adjusted channel value to one of the two extremes
//! (0 or 255) and yields the residual error to be diffused into neighboring
//! pixels.

/// Result of quantizing one channel value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantized {
    /// The quantized channel value, exactly 0.0 or 255.0
    pub value: f64,
    /// Signed residual `input - value`
    pub error: f64,
}

/// Quantize a channel value to 0 or 255
///
/// The input may lie outside `[0, 255]` after error accumulation and must not
/// be clamped before rounding. `f64::round` rounds half away from zero, so
/// 127.5 quantizes to 255. Inputs beyond the overshoot range still snap to
/// the nearer extreme: the rounded quotient is pinned to `{0, 1}`.
pub fn quantize(v: f64) -> Quantized {
    let value = (v / 255.0).round().clamp(0.0, 1.0) * 255.0;
    Quantized {
        value,
        error: v - value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_gray_rounds_up() {
        // 128/255 = 0.502 >= 0.5
        let q = quantize(128.0);
        assert_eq!(q.value, 255.0);
        assert_eq!(q.error, -127.0);
    }

    #[test]
    fn below_half_rounds_down() {
        let q = quantize(127.0);
        assert_eq!(q.value, 0.0);
        assert_eq!(q.error, 127.0);
    }

    #[test]
    fn exact_half_rounds_away_from_zero() {
        // pins the 50% boundary: 127.5/255 = 0.5 exactly
        let q = quantize(127.5);
        assert_eq!(q.value, 255.0);
        assert_eq!(q.error, -127.5);
    }

    #[test]
    fn extremes_are_fixed_points() {
        assert_eq!(quantize(0.0), Quantized { value: 0.0, error: 0.0 });
        assert_eq!(
            quantize(255.0),
            Quantized {
                value: 255.0,
                error: 0.0
            }
        );
    }

    #[test]
    fn accumulated_undershoot_rounds_to_zero() {
        let q = quantize(-40.25);
        assert_eq!(q.value, 0.0);
        assert_eq!(q.error, -40.25);
    }

    #[test]
    fn accumulated_overshoot_rounds_to_white() {
        let q = quantize(310.0);
        assert_eq!(q.value, 255.0);
        assert_eq!(q.error, 55.0);
    }

    #[test]
    fn far_out_of_range_snaps_to_nearer_extreme() {
        assert_eq!(quantize(400.0).value, 255.0);
        assert_eq!(quantize(-400.0).value, 0.0);
    }
}
