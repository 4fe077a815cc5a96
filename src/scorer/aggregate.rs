use super::normalizer::{effective_max, normalize};
use super::points::{max_points, points, record_weight};
use super::types::{CategorySummary, Confidence, SkillIssue, SkillScoreRecord};
use crate::catalog::{Category, SkillCatalog};
use crate::error::ScoreError;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Output of one aggregation pass over an evaluation's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// The six fixed categories in order, then `Unknown` if anything landed there.
    pub categories: Vec<CategorySummary>,
    pub total_points: f64,
    pub max_potential_points: f64,
    pub issues: Vec<SkillIssue>,
}

impl Aggregation {
    /// Number of records that contributed points.
    pub fn scored(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }
}

#[derive(Default, Clone, Copy)]
struct Bucket {
    count: usize,
    raw_points: f64,
    max_possible: f64,
}

pub fn raw_percentage(raw_points: f64, max_possible: f64) -> f64 {
    if max_possible > 0.0 {
        raw_points / max_possible * 100.0
    } else {
        0.0
    }
}

/// The one display transform for category percentages.
///
/// Inverted categories hold only penalties, so their raw percentage lives in
/// `[-100, 0]` and is shifted to `100 + raw`, where 100 means no negative
/// behaviour was observed. Empty categories always show 0.
pub fn display_percentage(raw_percentage: f64, inverted: bool, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let shown = if inverted {
        100.0 + raw_percentage
    } else {
        raw_percentage
    };
    shown.clamp(0.0, 100.0)
}

pub fn summarize(
    category: Category,
    count: usize,
    raw_points: f64,
    max_possible: f64,
    inverted: bool,
) -> CategorySummary {
    let raw_pct = raw_percentage(raw_points, max_possible);
    CategorySummary {
        category,
        count,
        raw_points,
        max_possible,
        raw_percentage: raw_pct,
        percentage: display_percentage(raw_pct, inverted, count),
        confidence: Confidence::Measured,
    }
}

/// Fills in the fixed category order. `Unknown` is appended only when present.
pub fn order_categories(mut by_category: BTreeMap<Category, CategorySummary>) -> Vec<CategorySummary> {
    let mut out: Vec<CategorySummary> = Category::FIXED
        .iter()
        .map(|&category| {
            by_category
                .remove(&category)
                .unwrap_or_else(|| CategorySummary::empty(category))
        })
        .collect();
    if let Some(unknown) = by_category.remove(&Category::Unknown) {
        if unknown.count > 0 {
            out.push(unknown);
        }
    }
    out
}

/// Groups records by category and sums points and ceilings.
///
/// A problem with one record is reported in `issues` and never stops the
/// remaining records from being counted.
pub fn aggregate(records: &[SkillScoreRecord], catalog: &SkillCatalog) -> Aggregation {
    let mut issues = Vec::new();

    let mut latest: BTreeMap<u32, &SkillScoreRecord> = BTreeMap::new();
    for record in records {
        if latest.insert(record.skill_id, record).is_some() {
            issues.push(SkillIssue::DuplicateRecord {
                skill_id: record.skill_id,
            });
        }
    }

    let mut buckets: BTreeMap<Category, Bucket> = BTreeMap::new();
    for (&skill_id, record) in &latest {
        let Some(definition) = catalog.get(skill_id) else {
            if catalog.ranges().category_for(skill_id).is_known() {
                warn!("⚠️  Skill {} is not in the catalog, skipping", skill_id);
                issues.push(SkillIssue::UncataloguedSkill { skill_id });
            } else {
                warn!("⚠️  Skill {} is outside every category range, skipping", skill_id);
                issues.push(SkillIssue::UnknownSkillId { skill_id });
            }
            continue;
        };

        let effective = match normalize(record, definition) {
            Ok(value) => value,
            Err(ScoreError::MissingScore { skill_id }) => {
                issues.push(SkillIssue::MissingScore { skill_id });
                continue;
            }
            Err(e) => {
                warn!("⚠️  Skill {}: {}", skill_id, e);
                continue;
            }
        };

        if !definition.category.is_known() {
            warn!("⚠️  Skill {} is outside every category range", skill_id);
            issues.push(SkillIssue::UnknownSkillId { skill_id });
        }

        let weight = match record_weight(record) {
            Some(weight) => weight,
            None => {
                warn!(
                    "⚠️  Skill {} has weight {}, using catalog weight {}",
                    skill_id, record.weight, definition.weight
                );
                issues.push(SkillIssue::InvalidWeight { skill_id });
                definition.weight
            }
        };

        let max_score = effective_max(record, definition);
        let bucket = buckets.entry(definition.category).or_default();
        bucket.count += 1;
        bucket.raw_points += points(effective, weight);
        bucket.max_possible += max_points(max_score, weight);
    }

    let by_category = buckets
        .into_iter()
        .map(|(category, b)| {
            let inverted = catalog.is_inverted(category);
            (
                category,
                summarize(category, b.count, b.raw_points, b.max_possible, inverted),
            )
        })
        .collect();
    let categories = order_categories(by_category);

    let total_points = categories.iter().map(|c| c.raw_points).sum();
    let max_potential_points = categories.iter().map(|c| c.max_possible).sum();

    debug!(
        "Aggregated {} records: total={:.3} max={:.3} issues={}",
        records.len(),
        total_points,
        max_potential_points,
        issues.len()
    );

    Aggregation {
        categories,
        total_points,
        max_potential_points,
        issues,
    }
}
