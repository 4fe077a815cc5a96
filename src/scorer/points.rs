use super::normalizer::normalize;
use super::types::SkillScoreRecord;
use crate::catalog::SkillDefinition;
use crate::error::ScResult;

#[inline(always)]
pub fn points(effective_score: f64, weight: f64) -> f64 {
    effective_score * weight
}

/// Ceiling used for `max_possible`, always from the positive max score.
#[inline(always)]
pub fn max_points(max_score: f64, weight: f64) -> f64 {
    max_score * weight
}

/// The record's weight snapshot, if it lies in `0..=1`.
pub fn record_weight(record: &SkillScoreRecord) -> Option<f64> {
    Some(record.weight).filter(|w| w.is_finite() && (0.0..=1.0).contains(w))
}

/// Weight to score with. An out-of-range snapshot falls back to the catalog weight.
pub fn effective_weight(record: &SkillScoreRecord, definition: &SkillDefinition) -> f64 {
    record_weight(record).unwrap_or(definition.weight)
}

/// Normalized points of one record.
pub fn record_points(record: &SkillScoreRecord, definition: &SkillDefinition) -> ScResult<f64> {
    let effective = normalize(record, definition)?;
    Ok(points(effective, effective_weight(record, definition)))
}

/// Rewrites the derived `points` field. A record without any score gets `None`.
pub fn refresh_points(record: &mut SkillScoreRecord, definition: &SkillDefinition) {
    record.points = record_points(record, definition).ok();
}
