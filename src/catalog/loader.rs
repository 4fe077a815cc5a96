use super::{Category, CategoryRanges, SkillCatalog, SkillDefinition};
use crate::consts::DEFAULT_SKILL_WEIGHT;
use crate::error::{ScResult, ScoreError};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: u32,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    polarity: Option<String>,
    #[serde(default)]
    is_good_skill: Option<bool>,
    max_score: u8,
    #[serde(default)]
    weight: Option<f64>,
}

fn parse_polarity(row: &CatalogRow) -> ScResult<bool> {
    if let Some(flag) = row.is_good_skill {
        return Ok(flag);
    }
    match row.polarity.as_deref().map(|p| p.trim().to_ascii_lowercase()) {
        Some(p) if matches!(p.as_str(), "good" | "positive" | "+" | "true") => Ok(true),
        Some(p) if matches!(p.as_str(), "bad" | "negative" | "-" | "false") => Ok(false),
        Some(p) => Err(ScoreError::Validation(format!(
            "skill {} has unrecognised polarity '{}'",
            row.id, p
        ))),
        None => Err(ScoreError::Validation(format!(
            "skill {} is missing a polarity",
            row.id
        ))),
    }
}

fn parse_category(row: &CatalogRow, ranges: &CategoryRanges) -> ScResult<Category> {
    match row.category.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.parse::<Category>().map_err(|_| {
            ScoreError::Validation(format!(
                "skill {} has unrecognised category '{}'",
                row.id, label
            ))
        }),
        _ => Ok(ranges.category_for(row.id)),
    }
}

/// Parses `id,name,category,polarity,max_score,weight` rows.
/// `category` falls back to the id range and `weight` to 1.0 when blank.
pub fn load_catalog_csv<R: Read>(
    reader: R,
    ranges: &CategoryRanges,
) -> ScResult<Vec<SkillDefinition>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut definitions = Vec::new();
    for result in rdr.deserialize::<CatalogRow>() {
        let row = result?;
        let category = parse_category(&row, ranges)?;
        let is_good_skill = parse_polarity(&row)?;
        definitions.push(SkillDefinition {
            id: row.id,
            name: row.name,
            category,
            is_good_skill,
            max_score: row.max_score,
            weight: row.weight.unwrap_or(DEFAULT_SKILL_WEIGHT),
        });
    }

    debug!("Parsed {} catalog rows", definitions.len());
    Ok(definitions)
}

pub fn load_catalog_json<R: Read>(reader: R) -> ScResult<Vec<SkillDefinition>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Loads a catalog file, choosing the parser by extension (`.json`, otherwise CSV).
pub fn load_catalog_file<P: AsRef<Path>>(path: P, ranges: CategoryRanges) -> ScResult<SkillCatalog> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let definitions = if is_json {
        load_catalog_json(file)?
    } else {
        load_catalog_csv(file, &ranges)?
    };

    info!("📚 Loaded {} skills from {}", definitions.len(), path.display());
    SkillCatalog::new(definitions, ranges)
}
