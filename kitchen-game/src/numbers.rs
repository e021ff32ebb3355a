//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round half-to-even and clamp into the `u32` range, returning 0 for NaN values.
///
/// Reward math rounds ties to the even neighbour so `0.5` coins becomes `0`
/// and `2.5` becomes `2`.
#[must_use]
pub fn round_even_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round_ties_even();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Round half-to-even and clamp into the `u32` range for `f32` inputs.
#[must_use]
pub fn round_even_f32_to_u32(value: f32) -> u32 {
    round_even_f64_to_u32(f64::from(value))
}

/// Scale an integer amount by a float multiplier with half-to-even rounding.
///
/// The product is taken in `f32` so `250 * 0.05` lands exactly on the `12.5`
/// tie instead of the widened `12.5000002`.
#[must_use]
pub fn scale_u32(amount: u32, multiplier: f32) -> u32 {
    round_even_f32_to_u32(u32_to_f32(amount) * multiplier)
}

/// Convert a count into `f32` while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_handles_non_finite_and_negative() {
        assert_eq!(round_even_f64_to_u32(f64::NAN), 0);
        assert_eq!(round_even_f64_to_u32(-12.0), 0);
        assert_eq!(round_even_f64_to_u32(f64::INFINITY), u32::MAX);
    }

    #[test]
    fn rounding_prefers_even_neighbour_on_ties() {
        assert_eq!(round_even_f64_to_u32(0.5), 0);
        assert_eq!(round_even_f64_to_u32(1.5), 2);
        assert_eq!(round_even_f64_to_u32(2.5), 2);
        assert_eq!(round_even_f64_to_u32(2.51), 3);
    }

    #[test]
    fn scale_applies_multiplier() {
        assert_eq!(scale_u32(100, 0.6), 60);
        assert_eq!(scale_u32(150, 0.05), 8);
        assert_eq!(scale_u32(0, 2.0), 0);
    }

    #[test]
    fn scale_keeps_single_precision_ties() {
        assert_eq!(scale_u32(250, 0.05), 12);
        assert_eq!(scale_u32(150, 0.15), 22);
        assert_eq!(scale_u32(90, 0.05), 4);
    }

    #[test]
    fn u32_conversion_is_exact_for_small_values() {
        assert!((u32_to_f32(42) - 42.0).abs() < f32::EPSILON);
    }
}
