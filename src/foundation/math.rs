/// Weights are expressed in thousandths so channel math stays exact and deterministic.
pub(crate) const WEIGHT_SCALE: u32 = 1000;

/// `sum(c[i] * w[i]) / 1000`, rounded half-up and saturated to the channel range.
pub(crate) fn weighted_channel(rgb: [u8; 3], w: [u32; 3]) -> u8 {
    let acc = u32::from(rgb[0]) * w[0] + u32::from(rgb[1]) * w[1] + u32::from(rgb[2]) * w[2];
    ((acc + WEIGHT_SCALE / 2) / WEIGHT_SCALE).min(255) as u8
}

/// Round a non-negative pixel coordinate to the nearest integer column/row.
pub(crate) fn round_px(v: f64) -> i64 {
    v.round() as i64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
