use crate::consts::AI_SCORE_LIMIT;
use crate::error::{ScResult, ScoreError};
use crate::scorer::calibrate::usable_custom;
use crate::scorer::types::AiAnalysis;
use crate::scorer::{
    EvaluationId, EvaluationScoreState, EvaluationSnapshot, Resolution, ScoreSource,
    ScoringEngine, SkillScoreRecord,
};
use crate::store::{ScoreStore, StoreError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// What a write does to the coach's divider override.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DividerUpdate {
    /// Reuse the override already persisted for the evaluation, if any.
    #[default]
    Keep,
    Set(f64),
    Clear,
}

/// Composes the engine with a store and serialises writes per evaluation.
///
/// Each write replaces whole records, reloads the full set, recomputes and
/// saves the state while holding that evaluation's lock.
pub struct ScoringService<S> {
    engine: Arc<ScoringEngine>,
    store: Arc<S>,
    locks: Mutex<HashMap<EvaluationId, Arc<Mutex<()>>>>,
}

impl<S> ScoringService<S>
where
    S: ScoreStore + 'static,
{
    pub fn new(engine: Arc<ScoringEngine>, store: Arc<S>) -> Self {
        Self {
            engine,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn evaluation_lock(&self, id: &EvaluationId) -> ScResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Unavailable("lock table poisoned".to_string()))?;
        Ok(locks.entry(id.clone()).or_default().clone())
    }

    fn with_lock<T>(&self, id: &EvaluationId, f: impl FnOnce() -> ScResult<T>) -> ScResult<T> {
        let lock = self.evaluation_lock(id)?;
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(StoreError::Unavailable(format!(
                "lock for evaluation {} poisoned",
                id
            ))
            .into()),
        };
        self.release_lock(id, lock);
        result
    }

    // Entries are cloned only under the table lock, so a count of two means
    // the table and this caller are the last holders.
    fn release_lock(&self, id: &EvaluationId, lock: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
    }

    /// Evaluations with a write in flight or waiting.
    pub fn pending_writes(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    /// Replaces the given records and recomputes the evaluation.
    pub fn rescore(
        &self,
        id: &EvaluationId,
        records: Vec<SkillScoreRecord>,
        divider: DividerUpdate,
    ) -> ScResult<EvaluationScoreState> {
        self.with_lock(id, || self.write_locked(id, records, divider))
    }

    /// Coach override of one skill's AI score. `None` removes the override.
    pub fn adjust_score(
        &self,
        id: &EvaluationId,
        skill_id: u32,
        adjusted: Option<f64>,
    ) -> ScResult<EvaluationScoreState> {
        self.with_lock(id, || {
            let mut record = self.current_record(id, skill_id)?;
            record.adjusted_score = adjusted;
            self.write_locked(id, vec![record], DividerUpdate::Keep)
        })
    }

    /// Coach-entered score. Automated skills take adjustments instead.
    pub fn record_manual_score(
        &self,
        id: &EvaluationId,
        skill_id: u32,
        manual: Option<f64>,
    ) -> ScResult<EvaluationScoreState> {
        self.with_lock(id, || {
            let mut record = self.current_record(id, skill_id)?;
            if record.is_automated {
                return Err(ScoreError::Validation(format!(
                    "skill {} is scored automatically; adjust it instead",
                    skill_id
                )));
            }
            record.manual_score = manual;
            self.write_locked(id, vec![record], DividerUpdate::Keep)
        })
    }

    /// Stores AI scores as automated records and recomputes.
    ///
    /// Scores are bounded to ±10. Entries for skills outside the catalog and
    /// non-finite scores are skipped. Coach fields already on a record are kept.
    pub fn apply_ai_analysis(
        &self,
        id: &EvaluationId,
        analysis: &AiAnalysis,
    ) -> ScResult<EvaluationScoreState> {
        self.with_lock(id, || {
            let mut existing: BTreeMap<u32, SkillScoreRecord> = self
                .store
                .load_score_records(id)?
                .into_iter()
                .map(|r| (r.skill_id, r))
                .collect();

            let mut touched = Vec::with_capacity(analysis.len());
            for (&skill_id, entry) in analysis {
                let Some(definition) = self.engine.catalog().get(skill_id) else {
                    warn!("⚠️  AI analysis scored unknown skill {}, skipping", skill_id);
                    continue;
                };
                if !entry.score.is_finite() {
                    warn!("⚠️  AI score for skill {} is not a number, skipping", skill_id);
                    continue;
                }

                let mut record = existing
                    .remove(&skill_id)
                    .unwrap_or_else(|| SkillScoreRecord::for_skill(id.clone(), definition));
                record.ai_raw_score = Some(entry.score.clamp(-AI_SCORE_LIMIT, AI_SCORE_LIMIT));
                record.is_automated = true;
                touched.push(record);
            }

            info!("🤖 Applying {} AI scores to {}", touched.len(), id);
            self.write_locked(id, touched, DividerUpdate::Keep)
        })
    }

    /// Recomputes from stored records with the persisted divider.
    pub fn recompute(&self, id: &EvaluationId) -> ScResult<EvaluationScoreState> {
        self.with_lock(id, || self.write_locked(id, Vec::new(), DividerUpdate::Keep))
    }

    /// Stored state if there is one, otherwise whatever the legacy data resolves to.
    pub fn current_state(&self, id: &EvaluationId) -> ScResult<Resolution> {
        if let Some(state) = self.store.load_score_state(id)? {
            return Ok(match state.source {
                ScoreSource::NoScoreData => Resolution::NoScoreData(state),
                _ => Resolution::Scored(state),
            });
        }

        let mut snapshot = self
            .store
            .load_evaluation(id)?
            .unwrap_or_else(|| EvaluationSnapshot::new(id.clone()));
        if snapshot.skill_scores.is_empty() {
            snapshot.skill_scores = self.store.load_score_records(id)?;
        }
        self.engine.resolve(&snapshot)
    }

    fn current_record(&self, id: &EvaluationId, skill_id: u32) -> ScResult<SkillScoreRecord> {
        let definition = self.engine.catalog().require(skill_id)?;
        Ok(self
            .store
            .load_score_records(id)?
            .into_iter()
            .find(|r| r.skill_id == skill_id)
            .unwrap_or_else(|| SkillScoreRecord::for_skill(id.clone(), definition)))
    }

    fn divider_for(&self, id: &EvaluationId, update: DividerUpdate) -> ScResult<Option<f64>> {
        match update {
            DividerUpdate::Set(divider) => usable_custom(Some(divider))
                .map(Some)
                .ok_or(ScoreError::InvalidDivider { divider }),
            DividerUpdate::Clear => Ok(None),
            DividerUpdate::Keep => {
                if let Some(state) = self.store.load_score_state(id)? {
                    return Ok(state.custom_divider());
                }
                Ok(self
                    .store
                    .load_evaluation(id)?
                    .and_then(|snapshot| usable_custom(snapshot.custom_divider)))
            }
        }
    }

    // Caller holds the evaluation lock.
    fn write_locked(
        &self,
        id: &EvaluationId,
        mut records: Vec<SkillScoreRecord>,
        divider: DividerUpdate,
    ) -> ScResult<EvaluationScoreState> {
        for record in &mut records {
            self.engine.refresh_points(record)?;
        }
        let custom = self.divider_for(id, divider)?;

        // A write that cannot be scored must leave the store untouched.
        let mut merged: BTreeMap<u32, SkillScoreRecord> = self
            .store
            .load_score_records(id)?
            .into_iter()
            .map(|r| (r.skill_id, r))
            .collect();
        merged.extend(records.iter().map(|r| (r.skill_id, r.clone())));
        let merged: Vec<SkillScoreRecord> = merged.into_values().collect();
        match self.engine.compute_state(id.clone(), &merged, custom) {
            Ok(_) | Err(ScoreError::NoScoreData { .. }) => {}
            Err(e) => return Err(e),
        }

        let touched = records.len();
        self.store.replace_score_records(id, records)?;
        let all = self.store.load_score_records(id)?;
        debug!("Recomputing {} ({} touched, {} total)", id, touched, all.len());

        match self.engine.compute_state(id.clone(), &all, custom) {
            Ok(state) => {
                self.store.save_score_state(state.clone())?;
                info!(
                    "💾 {} scored {:.1}/110 ({} issues)",
                    id,
                    state.display_final_score(),
                    state.issues.len()
                );
                Ok(state)
            }
            Err(e @ ScoreError::NoScoreData { .. }) => {
                let empty =
                    EvaluationScoreState::no_score_data(id.clone()).with_custom_divider(custom);
                self.store.save_score_state(empty)?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
