pub mod memory;

pub use self::memory::InMemoryScoreStore;

use crate::scorer::{EvaluationId, EvaluationScoreState, EvaluationSnapshot, SkillScoreRecord};

/// Persistence collaborator for score records and derived states.
///
/// Implementations only store and fetch. Atomicity of a read-modify-write
/// cycle is provided by the caller holding the per-evaluation lock.
pub trait ScoreStore: Send + Sync {
    fn load_score_records(&self, id: &EvaluationId) -> Result<Vec<SkillScoreRecord>, StoreError>;

    /// Replaces the records for the skills present in `records`, leaving the
    /// others untouched.
    fn replace_score_records(
        &self,
        id: &EvaluationId,
        records: Vec<SkillScoreRecord>,
    ) -> Result<(), StoreError>;

    fn load_score_state(&self, id: &EvaluationId)
        -> Result<Option<EvaluationScoreState>, StoreError>;

    fn save_score_state(&self, state: EvaluationScoreState) -> Result<(), StoreError>;

    /// Legacy evaluation document, if the store keeps one.
    fn load_evaluation(&self, id: &EvaluationId) -> Result<Option<EvaluationSnapshot>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record belongs to evaluation {found}, expected {expected}")]
    Mismatch {
        expected: EvaluationId,
        found: EvaluationId,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
