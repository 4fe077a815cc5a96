mod common;

use common::{assert_close, eval_id, standard_engine, RecordBuilder};
use speechscore::catalog::Category;
use speechscore::error::ScoreError;
use speechscore::scorer::types::{AiAnalysis, AiSkillScore};
use speechscore::scorer::{
    Confidence, DividerSource, EvaluationId, EvaluationSnapshot, Resolution, ScoreSource,
};
use speechscore::service::{DividerUpdate, ScoringService};
use speechscore::store::{InMemoryScoreStore, ScoreStore, StoreError};
use std::sync::Arc;
use std::thread;

fn service() -> ScoringService<InMemoryScoreStore> {
    ScoringService::new(Arc::new(standard_engine()), Arc::new(InMemoryScoreStore::new()))
}

fn ai(entries: &[(u32, f64)]) -> AiAnalysis {
    entries
        .iter()
        .map(|&(id, score)| {
            (
                id,
                AiSkillScore {
                    score,
                    explanation: format!("skill {}", id),
                },
            )
        })
        .collect()
}

#[test]
fn test_rescore_persists_records_and_state() {
    let svc = service();
    let id = eval_id();
    let records = vec![
        RecordBuilder::new(85).adjusted(8.0).build(),
        RecordBuilder::new(86).adjusted(6.0).build(),
    ];

    let state = svc.rescore(&id, records, DividerUpdate::Keep).unwrap();

    assert_close(state.final_score, 77.0);
    let stored = svc.store().load_score_records(&id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].points, Some(8.0));
    assert_eq!(svc.store().load_score_state(&id).unwrap(), Some(state));
}

#[test]
fn test_rescore_replaces_only_touched_skills() {
    let svc = service();
    let id = eval_id();
    svc.rescore(
        &id,
        vec![
            RecordBuilder::new(85).adjusted(8.0).build(),
            RecordBuilder::new(86).adjusted(6.0).build(),
        ],
        DividerUpdate::Keep,
    )
    .unwrap();

    let state = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(86).adjusted(2.0).build()],
            DividerUpdate::Keep,
        )
        .unwrap();

    let language = state.category(Category::Language).unwrap();
    assert_eq!(language.count, 2);
    assert_close(language.raw_points, 10.0);
}

#[test]
fn test_custom_divider_survives_recompute_until_cleared() {
    let svc = service();
    let id = eval_id();
    let records = vec![RecordBuilder::new(85).adjusted(5.0).build()];

    let set = svc.rescore(&id, records, DividerUpdate::Set(0.5)).unwrap();
    assert_eq!(set.divider_source, DividerSource::Custom);
    assert_close(set.final_score, 10.0);

    let kept = svc.adjust_score(&id, 85, Some(6.0)).unwrap();
    assert_eq!(kept.divider, 0.5);
    assert_close(kept.final_score, 12.0);

    let recomputed = svc.recompute(&id).unwrap();
    assert_eq!(recomputed.divider, 0.5);

    let cleared = svc.rescore(&id, Vec::new(), DividerUpdate::Clear).unwrap();
    assert_eq!(cleared.divider_source, DividerSource::Derived);
    assert_close(cleared.final_score, 66.0);
}

#[test]
fn test_unscoreable_write_leaves_store_untouched() {
    let svc = service();
    let id = eval_id();
    let before = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(85).adjusted(8.0).build()],
            DividerUpdate::Keep,
        )
        .unwrap();

    // The only scored skill loses its weight, so nothing is left to divide by.
    let err = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(85).adjusted(8.0).weight(0.0).build()],
            DividerUpdate::Keep,
        )
        .unwrap_err();
    assert!(matches!(err, ScoreError::InvalidDivider { .. }));

    let stored = svc.store().load_score_records(&id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].weight, 1.0);
    assert_eq!(svc.store().load_score_state(&id).unwrap(), Some(before));
}

#[test]
fn test_custom_divider_survives_unscored_write() {
    let svc = service();
    let id = eval_id();
    let err = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(85).build()],
            DividerUpdate::Set(0.5),
        )
        .unwrap_err();
    assert!(matches!(err, ScoreError::NoScoreData { .. }));

    let state = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(85).adjusted(4.0).build()],
            DividerUpdate::Keep,
        )
        .unwrap();
    assert_eq!(state.divider_source, DividerSource::Custom);
    assert_eq!(state.divider, 0.5);
    assert_close(state.final_score, 8.0);
}

#[test]
fn test_lock_table_is_emptied_after_writes() {
    let svc = Arc::new(service());

    thread::scope(|scope| {
        for n in 0..4 {
            let svc = Arc::clone(&svc);
            scope.spawn(move || {
                let id = EvaluationId::from(format!("talk-{}", n % 2));
                for skill_id in 85..=90 {
                    svc.record_manual_score(&id, skill_id, Some(5.0)).unwrap();
                }
            });
        }
    });
    let _ = svc.rescore(&eval_id(), Vec::new(), DividerUpdate::Keep);

    assert_eq!(svc.pending_writes(), 0);
}

#[test]
fn test_invalid_custom_divider_is_rejected() {
    let svc = service();
    let id = eval_id();
    let records = vec![RecordBuilder::new(85).adjusted(5.0).build()];
    let err = svc.rescore(&id, records, DividerUpdate::Set(0.0)).unwrap_err();
    assert!(matches!(err, ScoreError::InvalidDivider { .. }));
    assert!(svc.store().load_score_records(&id).unwrap().is_empty());
}

#[test]
fn test_records_for_another_evaluation_are_rejected() {
    let svc = service();
    let records = vec![RecordBuilder::new(85).eval("other").adjusted(5.0).build()];
    let err = svc
        .rescore(&eval_id(), records, DividerUpdate::Keep)
        .unwrap_err();
    assert!(matches!(err, ScoreError::Store(StoreError::Mismatch { .. })));
}

#[test]
fn test_uncatalogued_skill_write_is_rejected() {
    let svc = service();
    let records = vec![RecordBuilder::new(404).manual(5.0).build()];
    let err = svc
        .rescore(&eval_id(), records, DividerUpdate::Keep)
        .unwrap_err();
    assert!(matches!(err, ScoreError::UnknownSkillId { skill_id: 404 }));
}

#[test]
fn test_ai_analysis_is_clamped_and_filtered() {
    let svc = service();
    let id = eval_id();

    let state = svc
        .apply_ai_analysis(&id, &ai(&[(1, 15.0), (2, -4.0), (999, 3.0), (3, f64::NAN)]))
        .unwrap();

    let stored = svc.store().load_score_records(&id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].ai_raw_score, Some(10.0));
    assert!(stored.iter().all(|r| r.is_automated));

    // Skill 1 is a penalty, so the positive AI value counts as zero.
    let nervousness = state.category(Category::Nervousness).unwrap();
    assert_eq!(nervousness.count, 2);
    assert_close(nervousness.raw_points, -4.0);
    assert_close(nervousness.percentage, 80.0);
}

#[test]
fn test_coach_adjustment_survives_new_ai_run() {
    let svc = service();
    let id = eval_id();
    svc.apply_ai_analysis(&id, &ai(&[(2, -4.0)])).unwrap();
    svc.adjust_score(&id, 2, Some(-1.0)).unwrap();

    let state = svc.apply_ai_analysis(&id, &ai(&[(2, -6.0)])).unwrap();

    let record = &svc.store().load_score_records(&id).unwrap()[0];
    assert_eq!(record.ai_raw_score, Some(-6.0));
    assert_eq!(record.adjusted_score, Some(-1.0));
    assert_eq!(record.points, Some(-1.0));
    assert_close(state.total_points, -1.0);
}

#[test]
fn test_manual_score_on_automated_skill_is_rejected() {
    let svc = service();
    let id = eval_id();
    svc.apply_ai_analysis(&id, &ai(&[(2, -4.0)])).unwrap();

    let err = svc.record_manual_score(&id, 2, Some(-3.0)).unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));

    let state = svc.record_manual_score(&id, 85, Some(7.0)).unwrap();
    assert_eq!(state.category(Category::Language).unwrap().count, 1);
}

#[test]
fn test_concurrent_disjoint_edits_both_survive() {
    let svc = Arc::new(service());
    let id = eval_id();

    thread::scope(|scope| {
        for skills in [7u32..=20, 33u32..=46] {
            let svc = Arc::clone(&svc);
            let id = id.clone();
            scope.spawn(move || {
                for skill_id in skills {
                    svc.record_manual_score(&id, skill_id, Some(5.0)).unwrap();
                }
            });
        }
    });

    assert_eq!(svc.store().load_score_records(&id).unwrap().len(), 28);

    let state = svc.current_state(&id).unwrap().into_result().unwrap();
    assert_eq!(state.category(Category::Voice).unwrap().count, 14);
    assert_eq!(state.category(Category::BodyLanguage).unwrap().count, 14);
    assert_eq!(state, svc.recompute(&id).unwrap());
}

#[test]
fn test_concurrent_edits_to_same_skill_keep_whole_records() {
    let svc = Arc::new(service());
    let id = eval_id();

    thread::scope(|scope| {
        for value in [2.0, 9.0] {
            let svc = Arc::clone(&svc);
            let id = id.clone();
            scope.spawn(move || {
                for _ in 0..20 {
                    svc.adjust_score(&id, 85, Some(value)).unwrap();
                }
            });
        }
    });

    let record = &svc.store().load_score_records(&id).unwrap()[0];
    let adjusted = record.adjusted_score.unwrap();
    assert!(adjusted == 2.0 || adjusted == 9.0);
    assert_eq!(record.points, Some(adjusted));
}

#[test]
fn test_unscored_write_reports_no_score_data() {
    let svc = service();
    let id = eval_id();
    let err = svc
        .rescore(&id, vec![RecordBuilder::new(85).build()], DividerUpdate::Keep)
        .unwrap_err();
    assert!(matches!(err, ScoreError::NoScoreData { .. }));

    let resolution = svc.current_state(&id).unwrap();
    assert!(matches!(resolution, Resolution::NoScoreData(_)));
}

#[test]
fn test_current_state_falls_back_to_legacy_document() {
    let svc = service();
    let id = EvaluationId::from("legacy-1");
    let mut snapshot = EvaluationSnapshot::new(id.clone());
    snapshot.final_score = Some(50.0);
    svc.store().insert_evaluation(snapshot).unwrap();

    let state = svc.current_state(&id).unwrap().into_result().unwrap();
    assert_eq!(state.source, ScoreSource::FinalScoreEstimate);
    assert_eq!(state.confidence, Confidence::Estimated);

    let nothing = svc.current_state(&EvaluationId::from("missing")).unwrap();
    assert!(!nothing.is_scored());
}

#[test]
fn test_legacy_custom_divider_is_kept_on_first_write() {
    let svc = service();
    let id = eval_id();
    let mut snapshot = EvaluationSnapshot::new(id.clone());
    snapshot.custom_divider = Some(0.5);
    svc.store().insert_evaluation(snapshot).unwrap();

    let state = svc
        .rescore(
            &id,
            vec![RecordBuilder::new(85).adjusted(4.0).build()],
            DividerUpdate::Keep,
        )
        .unwrap();
    assert_eq!(state.divider_source, DividerSource::Custom);
    assert_close(state.final_score, 8.0);
}
