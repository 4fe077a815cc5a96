/// Fixed upper bound of the final-score scale.
pub const FINAL_SCORE_SCALE: f64 = 110.0;

/// Manual category blobs are entered on a 0..=10 scale and shown as percentages.
pub const MANUAL_SCORE_MAX: f64 = 10.0;
pub const MANUAL_SCORE_FACTOR: f64 = 10.0;

/// Magnitude bound of scores produced by the AI analysis step.
pub const AI_SCORE_LIMIT: f64 = 10.0;

pub const MIN_MAX_SCORE: u8 = 1;
pub const MAX_MAX_SCORE: u8 = 10;

pub const DEFAULT_SKILL_WEIGHT: f64 = 1.0;

/// Standard catalog shipped with the crate (110 skills).
pub const STANDARD_CATALOG_CSV: &str = include_str!("../data/skills.csv");
