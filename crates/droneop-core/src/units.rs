//! Metre/foot conversion for the flight height pair.
//!
//! Only the field graph calls these, so the two height fields cannot drift.

pub(crate) const METRES_PER_FOOT: f64 = 0.3048;

/// Round to two decimals, half away from zero.
pub(crate) fn round_centi(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Normalise -0.0 so fingerprints of equal values compare equal.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub(crate) fn metres_to_feet(metres: f64) -> f64 {
    round_centi(metres / METRES_PER_FOOT)
}

pub(crate) fn feet_to_metres(feet: f64) -> f64 {
    round_centi(feet * METRES_PER_FOOT)
}
