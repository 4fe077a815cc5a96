use crate::reports;
use clap::Args;
use rayon::prelude::*;
use serde_json::json;
use speechscore::config::EngineConfig;
use speechscore::error::ScResult;
use speechscore::scorer::loader::load_evaluation_file;
use speechscore::scorer::{Resolution, ScoringEngine};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub config: EngineConfig,

    /// Evaluation documents (JSON).
    #[arg(required = true)]
    pub files: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ResolveArgs, engine: Arc<ScoringEngine>) -> ScResult<()> {
    info!("🔎 Resolving {} evaluations", args.files.len());

    let outcomes: Vec<(String, ScResult<Resolution>)> = args
        .files
        .par_iter()
        .map(|path| {
            let outcome =
                load_evaluation_file(path).and_then(|snapshot| engine.resolve(&snapshot));
            (path.clone(), outcome)
        })
        .collect();

    let mut resolved = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(resolution) => resolved.push((path, resolution)),
            Err(e) => {
                warn!("⚠️  {}: {}", path, e);
                failures.push((path, e.to_string()));
            }
        }
    }

    if args.json {
        let mut entries: Vec<serde_json::Value> = resolved
            .iter()
            .map(|(path, resolution)| json!({ "file": path, "resolution": resolution }))
            .collect();
        entries.extend(
            failures
                .iter()
                .map(|(path, message)| json!({ "file": path, "error": message })),
        );
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    reports::print_summary_report(&resolved);
    if !failures.is_empty() {
        reports::print_failures(&failures);
    }
    Ok(())
}
