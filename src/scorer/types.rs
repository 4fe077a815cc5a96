use crate::catalog::{Category, SkillDefinition};
use crate::consts::FINAL_SCORE_SCALE;
use crate::error::{ScResult, ScoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EvaluationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EvaluationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn default_weight() -> f64 {
    crate::consts::DEFAULT_SKILL_WEIGHT
}

/// One scored skill of one evaluation. `max_score` and `weight` are snapshots
/// taken when the record was written and may diverge from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScoreRecord {
    #[serde(alias = "evaluation_id")]
    pub evaluation_id: EvaluationId,
    #[serde(alias = "skill_id")]
    pub skill_id: u32,
    #[serde(alias = "max_score")]
    pub max_score: u8,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, alias = "manual_score")]
    pub manual_score: Option<f64>,
    #[serde(default, alias = "ai_raw_score")]
    pub ai_raw_score: Option<f64>,
    #[serde(default, alias = "adjusted_score")]
    pub adjusted_score: Option<f64>,
    #[serde(default, alias = "is_automated")]
    pub is_automated: bool,
    /// Derived. Recomputed on every write, never trusted on read.
    #[serde(default)]
    pub points: Option<f64>,
}

impl SkillScoreRecord {
    /// Empty record carrying the catalog's current max score and weight.
    pub fn for_skill(evaluation_id: EvaluationId, definition: &SkillDefinition) -> Self {
        Self {
            evaluation_id,
            skill_id: definition.id,
            max_score: definition.max_score,
            weight: definition.weight,
            manual_score: None,
            ai_raw_score: None,
            adjusted_score: None,
            is_automated: false,
            points: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreOrigin {
    Adjusted,
    Manual,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Measured,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerSource {
    Derived,
    Custom,
    /// Carried over from legacy data without a recomputable basis.
    Stored,
}

/// Which path produced an `EvaluationScoreState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreSource {
    Snapshot,
    SkillScores,
    ManualBlob,
    FinalScoreEstimate,
    NoScoreData,
}

/// A problem with a single skill or entry that was handled locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkillIssue {
    MissingScore { skill_id: u32 },
    UnknownSkillId { skill_id: u32 },
    UncataloguedSkill { skill_id: u32 },
    DuplicateRecord { skill_id: u32 },
    InvalidWeight { skill_id: u32 },
    UnknownCategory { label: String },
    DuplicateCategory { label: String },
}

impl fmt::Display for SkillIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillIssue::MissingScore { skill_id } => {
                write!(f, "skill {skill_id} has no score and was skipped")
            }
            SkillIssue::UnknownSkillId { skill_id } => {
                write!(f, "skill {skill_id} is outside every category range")
            }
            SkillIssue::UncataloguedSkill { skill_id } => {
                write!(f, "skill {skill_id} is not in the catalog and was skipped")
            }
            SkillIssue::DuplicateRecord { skill_id } => {
                write!(f, "skill {skill_id} was scored more than once; last record kept")
            }
            SkillIssue::InvalidWeight { skill_id } => {
                write!(f, "skill {skill_id} has a weight outside 0..=1; catalog weight used")
            }
            SkillIssue::UnknownCategory { label } => {
                write!(f, "category '{label}' is not recognised")
            }
            SkillIssue::DuplicateCategory { label } => {
                write!(f, "category '{label}' appears more than once; first entry kept")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    pub raw_points: f64,
    pub max_possible: f64,
    pub raw_percentage: f64,
    pub percentage: f64,
    #[serde(default)]
    pub confidence: Confidence,
}

impl CategorySummary {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            count: 0,
            raw_points: 0.0,
            max_possible: 0.0,
            raw_percentage: 0.0,
            percentage: 0.0,
            confidence: Confidence::Measured,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScoreState {
    pub evaluation_id: EvaluationId,
    pub total_points: f64,
    pub max_potential_points: f64,
    pub divider: f64,
    pub divider_source: DividerSource,
    pub final_score: f64,
    pub categories: Vec<CategorySummary>,
    pub source: ScoreSource,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<SkillIssue>,
}

impl EvaluationScoreState {
    /// Zeros with `count = 0` in every fixed category.
    pub fn no_score_data(evaluation_id: EvaluationId) -> Self {
        Self {
            evaluation_id,
            total_points: 0.0,
            max_potential_points: 0.0,
            divider: 0.0,
            divider_source: DividerSource::Derived,
            final_score: 0.0,
            categories: Category::FIXED
                .iter()
                .map(|&category| CategorySummary::empty(category))
                .collect(),
            source: ScoreSource::NoScoreData,
            confidence: Confidence::Measured,
            issues: Vec::new(),
        }
    }

    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Final score pinned to the 0-110 display scale.
    pub fn display_final_score(&self) -> f64 {
        self.final_score.clamp(0.0, FINAL_SCORE_SCALE)
    }

    pub fn is_estimated(&self) -> bool {
        self.confidence == Confidence::Estimated
    }

    /// Marks a coach divider as in force without recalibrating.
    pub fn with_custom_divider(mut self, custom: Option<f64>) -> Self {
        if let Some(divider) = custom {
            self.divider = divider;
            self.divider_source = DividerSource::Custom;
        }
        self
    }

    /// The custom divider to carry into the next recomputation, if one is in force.
    pub fn custom_divider(&self) -> Option<f64> {
        match self.divider_source {
            DividerSource::Custom => Some(self.divider),
            _ => None,
        }
    }
}

/// Outcome of legacy resolution. `NoScoreData` must be rendered as "not yet scored".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "state", rename_all = "camelCase")]
pub enum Resolution {
    Scored(EvaluationScoreState),
    NoScoreData(EvaluationScoreState),
}

impl Resolution {
    pub fn state(&self) -> &EvaluationScoreState {
        match self {
            Resolution::Scored(state) | Resolution::NoScoreData(state) => state,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Resolution::Scored(_))
    }

    pub fn into_result(self) -> ScResult<EvaluationScoreState> {
        match self {
            Resolution::Scored(state) => Ok(state),
            Resolution::NoScoreData(state) => Err(ScoreError::NoScoreData {
                evaluation_id: state.evaluation_id.0,
            }),
        }
    }
}

/// One entry of the AI analysis output. Only `score` is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSkillScore {
    pub score: f64,
    #[serde(default)]
    pub explanation: String,
}

pub type AiAnalysis = BTreeMap<u32, AiSkillScore>;

/// Category entry of a precomputed `categories_summary` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCategorySummary {
    #[serde(alias = "name")]
    pub category: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default, alias = "raw_points", alias = "points")]
    pub raw_points: f64,
    #[serde(default, alias = "max_possible", alias = "maxPoints")]
    pub max_possible: f64,
}

/// An evaluation as persisted by older versions of the product. Any subset of
/// the fields may be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSnapshot {
    #[serde(alias = "evaluation_id", alias = "id")]
    pub evaluation_id: EvaluationId,
    #[serde(default, alias = "categories_summary")]
    pub categories_summary: Option<Vec<StoredCategorySummary>>,
    #[serde(default, alias = "skill_scores")]
    pub skill_scores: Vec<SkillScoreRecord>,
    #[serde(default, alias = "manual_scores")]
    pub manual_scores: Option<BTreeMap<String, f64>>,
    #[serde(default, alias = "final_score")]
    pub final_score: Option<f64>,
    #[serde(default, alias = "custom_divider", alias = "divider")]
    pub custom_divider: Option<f64>,
}

impl EvaluationSnapshot {
    pub fn new(evaluation_id: EvaluationId) -> Self {
        Self {
            evaluation_id,
            categories_summary: None,
            skill_scores: Vec::new(),
            manual_scores: None,
            final_score: None,
            custom_divider: None,
        }
    }
}
