use crate::catalog::{Category, CategoryRanges};
use crate::error::{ScResult, ScoreError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-category multipliers applied to a stored final score when nothing
    /// else is available (Nervousness, Voice, Body Language, Expressions,
    /// Language, Ultimate Level).
    #[arg(long, default_value = "0.85,0.9,0.8,0.85,0.9,0.75")]
    pub estimate_factors: String,

    /// Coach calibration of the 0-110 scale. Overrides the derived divider.
    #[arg(long)]
    pub custom_divider: Option<f64>,

    #[arg(skip)]
    pub ranges: CategoryRanges,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimate_factors: "0.85,0.9,0.8,0.85,0.9,0.75".to_string(),
            custom_divider: None,
            ranges: CategoryRanges::default(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ScResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: EngineConfig = serde_json::from_str(&content)?;
        config.ranges.validate()?;
        Ok(config)
    }

    pub fn get_estimate_factors(&self) -> ScResult<BTreeMap<Category, f64>> {
        let factors = parse_f64_array::<6>(&self.estimate_factors, "estimate_factors")?;
        Ok(Category::FIXED.into_iter().zip(factors).collect())
    }

    pub fn merge_from_cli(&mut self, cli_config: &EngineConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_config.$field.clone();
                }
            };
        }

        update_if_present!(estimate_factors, "estimate_factors");
        update_if_present!(custom_divider, "custom_divider");
    }
}

fn parse_f64_array<const N: usize>(s: &str, name: &str) -> ScResult<[f64; N]> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(ScoreError::Config(format!(
            "--{} requires {} values, got {}",
            name,
            N,
            parts.len()
        )));
    }
    let mut arr = [0.0; N];
    for (slot, part) in arr.iter_mut().zip(&parts) {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| ScoreError::Config(format!("Invalid number '{}' in {}", part, name)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ScoreError::Config(format!(
                "{} must be non-negative, got {}",
                name, value
            )));
        }
        *slot = value;
    }
    Ok(arr)
}
