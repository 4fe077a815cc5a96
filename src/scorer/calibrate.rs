use super::types::DividerSource;
use crate::consts::FINAL_SCORE_SCALE;
use crate::error::{ScResult, ScoreError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub divider: f64,
    pub final_score: f64,
    pub source: DividerSource,
}

/// A usable coach override: strictly positive and finite.
pub fn usable_custom(custom: Option<f64>) -> Option<f64> {
    custom.filter(|d| d.is_finite() && *d > 0.0)
}

/// Divider that maps this evaluation's own ceiling onto 110.
pub fn derive_divider(max_potential_points: f64) -> f64 {
    max_potential_points / FINAL_SCORE_SCALE
}

/// Rescales `total_points` onto the 0-110 scale.
///
/// The derived divider depends on what has been scored so far, so the final
/// score moves as more skills are scored. Callers must recompute after every
/// write.
pub fn calibrate(
    total_points: f64,
    max_potential_points: f64,
    custom_divider: Option<f64>,
) -> ScResult<Calibration> {
    let (divider, source) = match usable_custom(custom_divider) {
        Some(custom) => (custom, DividerSource::Custom),
        None => (derive_divider(max_potential_points), DividerSource::Derived),
    };

    if !divider.is_finite() || divider <= 0.0 {
        return Err(ScoreError::InvalidDivider { divider });
    }

    Ok(Calibration {
        divider,
        final_score: total_points / divider,
        source,
    })
}
