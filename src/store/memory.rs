use super::{ScoreStore, StoreError};
use crate::scorer::{EvaluationId, EvaluationScoreState, EvaluationSnapshot, SkillScoreRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

type RecordMap = HashMap<EvaluationId, BTreeMap<u32, SkillScoreRecord>>;

/// Mutex-guarded maps. Cloning shares the underlying storage.
#[derive(Default, Clone)]
pub struct InMemoryScoreStore {
    records: Arc<Mutex<RecordMap>>,
    states: Arc<Mutex<HashMap<EvaluationId, EvaluationScoreState>>>,
    evaluations: Arc<Mutex<HashMap<EvaluationId, EvaluationSnapshot>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a legacy evaluation document.
    pub fn insert_evaluation(&self, snapshot: EvaluationSnapshot) -> Result<(), StoreError> {
        lock(&self.evaluations)?.insert(snapshot.evaluation_id.clone(), snapshot);
        Ok(())
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn load_score_records(&self, id: &EvaluationId) -> Result<Vec<SkillScoreRecord>, StoreError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .get(id)
            .map(|by_skill| by_skill.values().cloned().collect())
            .unwrap_or_default())
    }

    fn replace_score_records(
        &self,
        id: &EvaluationId,
        records: Vec<SkillScoreRecord>,
    ) -> Result<(), StoreError> {
        if let Some(stray) = records.iter().find(|r| &r.evaluation_id != id) {
            return Err(StoreError::Mismatch {
                expected: id.clone(),
                found: stray.evaluation_id.clone(),
            });
        }
        let mut guard = lock(&self.records)?;
        let by_skill = guard.entry(id.clone()).or_default();
        for record in records {
            by_skill.insert(record.skill_id, record);
        }
        Ok(())
    }

    fn load_score_state(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<EvaluationScoreState>, StoreError> {
        Ok(lock(&self.states)?.get(id).cloned())
    }

    fn save_score_state(&self, state: EvaluationScoreState) -> Result<(), StoreError> {
        lock(&self.states)?.insert(state.evaluation_id.clone(), state);
        Ok(())
    }

    fn load_evaluation(&self, id: &EvaluationId) -> Result<Option<EvaluationSnapshot>, StoreError> {
        Ok(lock(&self.evaluations)?.get(id).cloned())
    }
}
