use crate::reports;
use clap::Args;
use speechscore::config::EngineConfig;
use speechscore::error::{ScResult, ScoreError};
use speechscore::scorer::loader::load_records_file;
use speechscore::scorer::{
    EvaluationId, EvaluationScoreState, Resolution, ScoringEngine, SkillScoreRecord,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: EngineConfig,

    /// Skill score records (CSV or JSON).
    #[arg(short, long)]
    pub records: String,

    /// Print states as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ScoreArgs, engine: Arc<ScoringEngine>) -> ScResult<()> {
    let records = load_records_file(&args.records)?;

    let mut by_evaluation: BTreeMap<EvaluationId, Vec<SkillScoreRecord>> = BTreeMap::new();
    for record in records {
        by_evaluation
            .entry(record.evaluation_id.clone())
            .or_default()
            .push(record);
    }

    let mut results = Vec::with_capacity(by_evaluation.len());
    for (id, records) in by_evaluation {
        info!("📝 Scoring {} ({} records)", id, records.len());
        let resolution = match engine.compute_state(id.clone(), &records, None) {
            Ok(state) => Resolution::Scored(state),
            Err(ScoreError::NoScoreData { .. }) => {
                warn!("⚠️  {} has no usable scores", id);
                Resolution::NoScoreData(EvaluationScoreState::no_score_data(id.clone()))
            }
            Err(e) => return Err(e),
        };
        results.push((id.to_string(), resolution));
    }

    if args.json {
        let states: Vec<&Resolution> = results.iter().map(|(_, r)| r).collect();
        println!("{}", serde_json::to_string_pretty(&states)?);
        return Ok(());
    }

    for (name, resolution) in &results {
        if let Resolution::Scored(state) = resolution {
            reports::print_category_report(name, state);
            reports::print_issues(state);
        }
    }
    reports::print_summary_report(&results);
    Ok(())
}
