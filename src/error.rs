use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store Error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("skill {skill_id} has no adjusted, manual or AI score")]
    MissingScore { skill_id: u32 },

    #[error("divider {divider} is not usable (must be a positive finite number)")]
    InvalidDivider { divider: f64 },

    #[error("skill id {skill_id} falls outside every configured category range")]
    UnknownSkillId { skill_id: u32 },

    #[error("evaluation '{evaluation_id}' has no score data")]
    NoScoreData { evaluation_id: String },
}

pub type ScResult<T> = Result<T, ScoreError>;
