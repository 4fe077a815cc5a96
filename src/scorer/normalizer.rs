use super::types::{ScoreOrigin, SkillScoreRecord};
use crate::catalog::SkillDefinition;
use crate::error::{ScResult, ScoreError};

/// Picks the score in force by priority adjusted, manual, ai.
/// Non-finite values count as absent.
pub fn select_raw(record: &SkillScoreRecord) -> Option<(f64, ScoreOrigin)> {
    [
        (record.adjusted_score, ScoreOrigin::Adjusted),
        (record.manual_score, ScoreOrigin::Manual),
        (record.ai_raw_score, ScoreOrigin::Ai),
    ]
    .into_iter()
    .find_map(|(value, origin)| value.filter(|v| v.is_finite()).map(|v| (v, origin)))
}

/// Magnitude bound for a record: its own snapshot, or the catalog's when the
/// snapshot is unset.
pub fn effective_max(record: &SkillScoreRecord, definition: &SkillDefinition) -> f64 {
    if record.max_score > 0 {
        f64::from(record.max_score)
    } else {
        f64::from(definition.max_score)
    }
}

/// Clamps `value` into the polarity range. Wrong-sign input lands on 0.
pub fn clamp_to_polarity(value: f64, max_score: f64, definition: &SkillDefinition) -> f64 {
    let (lo, hi) = definition.polarity().bounds(max_score);
    value.clamp(lo, hi)
}

pub fn normalize(record: &SkillScoreRecord, definition: &SkillDefinition) -> ScResult<f64> {
    let (raw, _) = select_raw(record).ok_or(ScoreError::MissingScore {
        skill_id: record.skill_id,
    })?;
    Ok(clamp_to_polarity(
        raw,
        effective_max(record, definition),
        definition,
    ))
}
