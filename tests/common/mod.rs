#![allow(dead_code)]

use speechscore::catalog::{Category, CategoryRanges, SkillCatalog, SkillDefinition};
use speechscore::config::EngineConfig;
use speechscore::scorer::{EngineBuildParams, EvaluationId, ScoringEngine, SkillScoreRecord};

pub const EVAL: &str = "eval-1";

pub fn eval_id() -> EvaluationId {
    EvaluationId::from(EVAL)
}

pub fn standard_catalog() -> SkillCatalog {
    SkillCatalog::standard(CategoryRanges::default()).unwrap()
}

pub fn standard_engine() -> ScoringEngine {
    ScoringEngine::standard().unwrap()
}

pub fn engine_with(config: EngineConfig) -> ScoringEngine {
    EngineBuildParams::builder()
        .catalog(standard_catalog())
        .config(config)
        .build()
        .build_engine()
        .unwrap()
}

/// Builder for SkillDefinition to keep catalog fixtures short.
pub struct SkillBuilder {
    def: SkillDefinition,
}

impl SkillBuilder {
    pub fn good(id: u32, category: Category) -> Self {
        Self {
            def: SkillDefinition {
                id,
                name: format!("skill {}", id),
                category,
                is_good_skill: true,
                max_score: 10,
                weight: 1.0,
            },
        }
    }

    pub fn bad(id: u32, category: Category) -> Self {
        let mut builder = Self::good(id, category);
        builder.def.is_good_skill = false;
        builder
    }

    pub fn max(mut self, max_score: u8) -> Self {
        self.def.max_score = max_score;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.def.weight = weight;
        self
    }

    pub fn build(self) -> SkillDefinition {
        self.def
    }
}

/// Builder for SkillScoreRecord. Max score and weight default to 10 and 1.
pub struct RecordBuilder {
    record: SkillScoreRecord,
}

impl RecordBuilder {
    pub fn new(skill_id: u32) -> Self {
        Self {
            record: SkillScoreRecord {
                evaluation_id: eval_id(),
                skill_id,
                max_score: 10,
                weight: 1.0,
                manual_score: None,
                ai_raw_score: None,
                adjusted_score: None,
                is_automated: false,
                points: None,
            },
        }
    }

    /// Record carrying the catalog's snapshot of max score and weight.
    pub fn from_catalog(catalog: &SkillCatalog, skill_id: u32) -> Self {
        let def = catalog.get(skill_id).unwrap();
        Self::new(skill_id).max(def.max_score).weight(def.weight)
    }

    pub fn eval(mut self, id: &str) -> Self {
        self.record.evaluation_id = EvaluationId::from(id);
        self
    }

    pub fn max(mut self, max_score: u8) -> Self {
        self.record.max_score = max_score;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.record.weight = weight;
        self
    }

    pub fn manual(mut self, score: f64) -> Self {
        self.record.manual_score = Some(score);
        self
    }

    pub fn ai(mut self, score: f64) -> Self {
        self.record.ai_raw_score = Some(score);
        self.record.is_automated = true;
        self
    }

    pub fn adjusted(mut self, score: f64) -> Self {
        self.record.adjusted_score = Some(score);
        self
    }

    pub fn build(self) -> SkillScoreRecord {
        self.record
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
