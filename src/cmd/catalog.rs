use crate::reports;
use clap::Args;
use speechscore::catalog::{Category, SkillDefinition};
use speechscore::error::{ScResult, ScoreError};
use speechscore::scorer::ScoringEngine;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Only list skills of this category.
    #[arg(short = 'C', long)]
    pub category: Option<String>,
}

pub fn run(args: CatalogArgs, engine: Arc<ScoringEngine>) -> ScResult<()> {
    let catalog = engine.catalog();

    let filter = match &args.category {
        Some(label) => Some(Category::from_label(label).ok_or_else(|| {
            ScoreError::Config(format!("unknown category '{}'", label))
        })?),
        None => None,
    };

    let skills: Vec<&SkillDefinition> = catalog
        .iter()
        .filter(|skill| filter.map_or(true, |category| skill.category == category))
        .collect();

    reports::print_catalog(&skills, catalog);
    Ok(())
}
