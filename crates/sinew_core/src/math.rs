//! Float comparison helpers.

/// Tolerance used when deciding whether an animated scale is the identity.
///
/// This is one ulp of `1.0_f32` rounded up, so only values that are
/// bit-for-bit one or their immediate neighbours count.
pub const NEAR_ONE_EPSILON: f32 = 1.2e-7;

/// Returns true when `value` lies strictly within `epsilon` of 1.0.
#[inline]
#[must_use]
pub fn is_almost_one(value: f32, epsilon: f32) -> bool {
    (value - 1.0).abs() < epsilon
}

/// Returns true when both slices have the same length and equal elements.
///
/// Comparison is exact; `NaN` never equals anything.
#[inline]
#[must_use]
pub fn slices_equal(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}
