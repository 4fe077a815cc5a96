use super::aggregate::{display_percentage, order_categories, summarize};
use super::calibrate::usable_custom;
use super::types::{
    CategorySummary, Confidence, DividerSource, EvaluationScoreState, EvaluationSnapshot,
    Resolution, ScoreSource, SkillIssue, StoredCategorySummary,
};
use super::{assemble_state, ScoringEngine};
use crate::catalog::Category;
use crate::consts::{FINAL_SCORE_SCALE, MANUAL_SCORE_FACTOR, MANUAL_SCORE_MAX};
use crate::error::ScResult;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rebuilds a score state from whatever an older evaluation carries.
///
/// Sources are tried in a fixed order and the first one that yields at least
/// one category wins:
///
/// 1. a precomputed `categories_summary` snapshot, if every entry is populated
/// 2. the skill score records
/// 3. a manual blob of 0-10 scores keyed by category name
/// 4. an estimate from the stored final score, labeled `estimated`
///
/// When none applies the result is `Resolution::NoScoreData`.
pub fn resolve(engine: &ScoringEngine, snapshot: &EvaluationSnapshot) -> ScResult<Resolution> {
    let custom = engine.divider_override(snapshot.custom_divider);

    if let Some(entries) = &snapshot.categories_summary {
        if let Some(state) = from_summary(engine, snapshot, entries, custom)? {
            debug!("Resolved {} from stored category summary", snapshot.evaluation_id);
            return Ok(Resolution::Scored(state));
        }
    }

    if !snapshot.skill_scores.is_empty() {
        let aggregation = engine.aggregate(&snapshot.skill_scores);
        if aggregation.scored() > 0 {
            let state = assemble_state(
                snapshot.evaluation_id.clone(),
                aggregation.categories,
                aggregation.issues,
                custom,
                ScoreSource::SkillScores,
            )?;
            debug!("Resolved {} from skill scores", snapshot.evaluation_id);
            return Ok(Resolution::Scored(state));
        }
    }

    if let Some(blob) = &snapshot.manual_scores {
        if let Some(state) = from_manual_blob(snapshot, blob, custom)? {
            debug!("Resolved {} from manual scores", snapshot.evaluation_id);
            return Ok(Resolution::Scored(state));
        }
    }

    if let Some(final_score) = snapshot.final_score.filter(|f| f.is_finite()) {
        warn!(
            "⚠️  {} has only a final score; category values are estimated",
            snapshot.evaluation_id
        );
        return Ok(Resolution::Scored(estimate(
            engine,
            snapshot,
            final_score,
            custom,
        )));
    }

    debug!("No score data for {}", snapshot.evaluation_id);
    Ok(Resolution::NoScoreData(EvaluationScoreState::no_score_data(
        snapshot.evaluation_id.clone(),
    )))
}

fn is_populated(entry: &StoredCategorySummary) -> bool {
    entry.count > 0
        && entry.raw_points.is_finite()
        && entry.max_possible.is_finite()
        && entry.max_possible > 0.0
}

fn from_summary(
    engine: &ScoringEngine,
    snapshot: &EvaluationSnapshot,
    entries: &[StoredCategorySummary],
    custom: Option<f64>,
) -> ScResult<Option<EvaluationScoreState>> {
    if entries.is_empty() || !entries.iter().all(is_populated) {
        return Ok(None);
    }

    let mut issues = Vec::new();
    let mut by_category: BTreeMap<Category, CategorySummary> = BTreeMap::new();
    for entry in entries {
        let Some(category) = Category::from_label(&entry.category) else {
            issues.push(SkillIssue::UnknownCategory {
                label: entry.category.clone(),
            });
            continue;
        };
        if by_category.contains_key(&category) {
            issues.push(SkillIssue::DuplicateCategory {
                label: entry.category.clone(),
            });
            continue;
        }
        let inverted = engine.catalog().is_inverted(category);
        by_category.insert(
            category,
            summarize(
                category,
                entry.count,
                entry.raw_points,
                entry.max_possible,
                inverted,
            ),
        );
    }

    if by_category.is_empty() {
        return Ok(None);
    }

    assemble_state(
        snapshot.evaluation_id.clone(),
        order_categories(by_category),
        issues,
        custom,
        ScoreSource::Snapshot,
    )
    .map(Some)
}

fn from_manual_blob(
    snapshot: &EvaluationSnapshot,
    blob: &BTreeMap<String, f64>,
    custom: Option<f64>,
) -> ScResult<Option<EvaluationScoreState>> {
    let mut issues = Vec::new();
    let mut by_category: BTreeMap<Category, CategorySummary> = BTreeMap::new();

    for (label, &value) in blob {
        let Some(category) = Category::from_label(label) else {
            issues.push(SkillIssue::UnknownCategory {
                label: label.clone(),
            });
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        if by_category.contains_key(&category) {
            issues.push(SkillIssue::DuplicateCategory {
                label: label.clone(),
            });
            continue;
        }

        let score = value.clamp(0.0, MANUAL_SCORE_MAX);
        let pct = score * MANUAL_SCORE_FACTOR;
        by_category.insert(
            category,
            CategorySummary {
                category,
                count: 1,
                raw_points: score,
                max_possible: MANUAL_SCORE_MAX,
                raw_percentage: pct,
                percentage: display_percentage(pct, false, 1),
                confidence: Confidence::Measured,
            },
        );
    }

    if by_category.is_empty() {
        return Ok(None);
    }

    assemble_state(
        snapshot.evaluation_id.clone(),
        order_categories(by_category),
        issues,
        custom,
        ScoreSource::ManualBlob,
    )
    .map(Some)
}

fn estimate(
    engine: &ScoringEngine,
    snapshot: &EvaluationSnapshot,
    final_score: f64,
    custom: Option<f64>,
) -> EvaluationScoreState {
    let categories = Category::FIXED
        .iter()
        .map(|&category| {
            let factor = engine
                .estimate_factors()
                .get(&category)
                .copied()
                .unwrap_or(0.0);
            let pct = (final_score * factor).clamp(0.0, 100.0);
            CategorySummary {
                category,
                count: 0,
                raw_points: 0.0,
                max_possible: 0.0,
                raw_percentage: pct,
                percentage: pct,
                confidence: Confidence::Estimated,
            }
        })
        .collect();

    let (divider, divider_source) = match usable_custom(custom) {
        Some(d) => (d, DividerSource::Custom),
        None => (1.0, DividerSource::Stored),
    };

    EvaluationScoreState {
        evaluation_id: snapshot.evaluation_id.clone(),
        total_points: final_score * divider,
        max_potential_points: FINAL_SCORE_SCALE * divider,
        divider,
        divider_source,
        final_score,
        categories,
        source: ScoreSource::FinalScoreEstimate,
        confidence: Confidence::Estimated,
        issues: Vec::new(),
    }
}
