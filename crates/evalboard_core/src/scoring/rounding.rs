//! Decimal rounding helpers shared by scorers and aggregators.

// Absorbs binary representation error so that e.g. 8.15 (stored as
// 8.1499999...) still lands on the intended decimal boundary.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Rounds half away from zero to `places` decimals.
pub(crate) fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    let scaled = value * factor;
    (scaled + BOUNDARY_EPSILON.copysign(scaled)).round() / factor
}

/// Discards digits beyond `places` decimals.
pub(crate) fn truncate(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    let scaled = value * factor;
    (scaled + BOUNDARY_EPSILON.copysign(scaled)).trunc() / factor
}
