pub mod aggregate;
pub mod builder;
pub mod calibrate;
pub mod legacy;
pub mod loader;
pub mod normalizer;
pub mod points;
pub mod types;

pub use self::aggregate::Aggregation;
pub use self::builder::EngineBuildParams;
pub use self::calibrate::Calibration;
pub use self::types::{
    CategorySummary, Confidence, DividerSource, EvaluationId, EvaluationScoreState,
    EvaluationSnapshot, Resolution, ScoreSource, SkillIssue, SkillScoreRecord,
};

use crate::catalog::{Category, SkillCatalog};
use crate::config::EngineConfig;
use crate::error::{ScResult, ScoreError};
use std::collections::BTreeMap;
use tracing::debug;

/// Stateless scoring pipeline bound to one catalog and configuration.
///
/// Every method is a pure function of its inputs, so the engine can be shared
/// across threads and called after every write.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: SkillCatalog,
    config: EngineConfig,
    estimate_factors: BTreeMap<Category, f64>,
    debug: bool,
}

impl ScoringEngine {
    /// Standard embedded catalog with default configuration.
    pub fn standard() -> ScResult<Self> {
        let config = EngineConfig::default();
        let catalog = SkillCatalog::standard(config.ranges.clone())?;
        EngineBuildParams::builder()
            .catalog(catalog)
            .config(config)
            .build()
            .build_engine()
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn estimate_factors(&self) -> &BTreeMap<Category, f64> {
        &self.estimate_factors
    }

    /// The divider override in force: the caller's if usable, else the configured one.
    pub fn divider_override(&self, custom: Option<f64>) -> Option<f64> {
        calibrate::usable_custom(custom).or(self.config.custom_divider)
    }

    pub fn normalize(&self, record: &SkillScoreRecord) -> ScResult<f64> {
        let definition = self.catalog.require(record.skill_id)?;
        normalizer::normalize(record, definition)
    }

    pub fn refresh_points(&self, record: &mut SkillScoreRecord) -> ScResult<()> {
        let definition = self.catalog.require(record.skill_id)?;
        points::refresh_points(record, definition);
        Ok(())
    }

    pub fn aggregate(&self, records: &[SkillScoreRecord]) -> Aggregation {
        aggregate::aggregate(records, &self.catalog)
    }

    pub fn calibrate(
        &self,
        total_points: f64,
        max_potential_points: f64,
        custom_divider: Option<f64>,
    ) -> ScResult<Calibration> {
        calibrate::calibrate(total_points, max_potential_points, custom_divider)
    }

    /// Forward pipeline: records to a complete score state.
    ///
    /// Fails with `NoScoreData` when no record carries a usable score, and
    /// with `InvalidDivider` when the scored skills have no weight at all.
    pub fn compute_state(
        &self,
        evaluation_id: EvaluationId,
        records: &[SkillScoreRecord],
        custom_divider: Option<f64>,
    ) -> ScResult<EvaluationScoreState> {
        let aggregation = self.aggregate(records);
        if aggregation.scored() == 0 {
            return Err(ScoreError::NoScoreData {
                evaluation_id: evaluation_id.0,
            });
        }

        let state = assemble_state(
            evaluation_id,
            aggregation.categories,
            aggregation.issues,
            self.divider_override(custom_divider),
            ScoreSource::SkillScores,
        )?;

        if self.debug {
            debug!(
                "   [Debug] {}: total={:.3} max={:.3} divider={:.4} final={:.2}",
                state.evaluation_id,
                state.total_points,
                state.max_potential_points,
                state.divider,
                state.final_score
            );
        }
        Ok(state)
    }

    pub fn resolve(&self, snapshot: &EvaluationSnapshot) -> ScResult<Resolution> {
        legacy::resolve(self, snapshot)
    }
}

/// Sums category totals, calibrates and packs the result.
pub(crate) fn assemble_state(
    evaluation_id: EvaluationId,
    categories: Vec<CategorySummary>,
    issues: Vec<SkillIssue>,
    custom_divider: Option<f64>,
    source: ScoreSource,
) -> ScResult<EvaluationScoreState> {
    let total_points: f64 = categories.iter().map(|c| c.raw_points).sum();
    let max_potential_points: f64 = categories.iter().map(|c| c.max_possible).sum();
    let calibration = calibrate::calibrate(total_points, max_potential_points, custom_divider)?;

    Ok(EvaluationScoreState {
        evaluation_id,
        total_points,
        max_potential_points,
        divider: calibration.divider,
        divider_source: calibration.source,
        final_score: calibration.final_score,
        categories,
        source,
        confidence: Confidence::Measured,
        issues,
    })
}
