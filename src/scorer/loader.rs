use super::types::{AiAnalysis, EvaluationSnapshot, SkillScoreRecord};
use crate::error::{ScResult, ScoreError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Reads score records from CSV. Header names may be camelCase or snake_case;
/// blank score cells are treated as absent.
pub fn load_records_csv<R: Read>(reader: R) -> ScResult<Vec<SkillScoreRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize::<SkillScoreRecord>() {
        records.push(result?);
    }
    debug!("Parsed {} score rows", records.len());
    Ok(records)
}

pub fn load_records_json<R: Read>(reader: R) -> ScResult<Vec<SkillScoreRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_records_file<P: AsRef<Path>>(path: P) -> ScResult<Vec<SkillScoreRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ScoreError::Config(format!("could not open records at '{}': {}", path.display(), e))
    })?;

    let records = if is_json(path) {
        load_records_json(file)?
    } else {
        load_records_csv(file)?
    };

    info!("📄 Loaded {} score records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_evaluation_file<P: AsRef<Path>>(path: P) -> ScResult<EvaluationSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let snapshot: EvaluationSnapshot = serde_json::from_reader(file)?;
    debug!("Loaded evaluation {} from {}", snapshot.evaluation_id, path.display());
    Ok(snapshot)
}

pub fn load_ai_analysis<R: Read>(reader: R) -> ScResult<AiAnalysis> {
    Ok(serde_json::from_reader(reader)?)
}
